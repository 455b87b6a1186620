use chrono::NaiveDate;

/// Calendar days until expiration, never less than one.
///
/// Contracts expiring today (or already past) count as one day so annualised
/// figures stay finite.
pub fn days_to_expiration(expiration: NaiveDate, as_of: NaiveDate) -> u32 {
    let days = (expiration - as_of).num_days();
    days.max(1) as u32
}

/// Multiplier turning a per-period return into an annual one
pub fn annual_factor(days: u32) -> f64 {
    365.0 / days.max(1) as f64
}

/// Time to expiration in years (ACT/365)
pub fn years(days: u32) -> f64 {
    days as f64 / 365.0
}

/// Display form used in report titles, e.g. `Jan 5, 2025`
pub fn format_expiration(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
