/// Trading days per year used to annualise daily volatility
pub const TRADING_DAYS: f64 = 252.0;

/// Annualised close-to-close volatility.
///
/// Population standard deviation of daily log returns times `sqrt(252)`.
/// Fewer than two closes, or any non-positive close, gives zero.
pub fn historical_volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 || closes.iter().any(|c| *c <= 0.0 || !c.is_finite()) {
        return 0.0;
    }

    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * TRADING_DAYS.sqrt()
}
