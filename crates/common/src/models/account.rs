/// Account state read fresh at the start of every tick. Never cached
/// across iterations.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub symbol: String,
    pub cash: f64,
    pub last_price: f64,
}
