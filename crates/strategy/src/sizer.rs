/// Shares to deploy for one entry: `round(cash * cash_at_risk / last_price)`.
///
/// Returns 0 when `last_price` is non-positive or not finite; 0 means
/// "do not trade" and is never submitted.
pub fn position_size(cash: f64, last_price: f64, cash_at_risk: f64) -> u64 {
    if last_price <= 0.0 || !last_price.is_finite() {
        return 0;
    }

    let quantity = (cash * cash_at_risk / last_price).round();
    if quantity.is_sign_negative() || !quantity.is_finite() {
        0
    } else {
        quantity as u64
    }
}
