/// Simple moving average of the last `period` values
///
/// Returns `None` when the series is shorter than the period or the period is zero.
pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let sum: f64 = values[values.len() - period..].iter().sum();
    Some(sum / period as f64)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
