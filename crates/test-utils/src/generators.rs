//! Generators for synthetic, verifiable time series.

/// `count` values starting at `start`, increasing by `step`.
///
/// ```
/// use test_utils::linear_series;
///
/// assert_eq!(linear_series(3, 10.0, 0.5), vec![10.0, 10.5, 11.0]);
/// ```
pub fn linear_series(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// A diurnal temperature cycle in degrees Celsius, one value per hour.
///
/// Peaks at 15:00 local time with the given mean and amplitude.
pub fn diurnal_temperature(hours: usize, mean: f64, amplitude: f64) -> Vec<f64> {
    (0..hours)
        .map(|h| {
            let phase = ((h % 24) as f64 - 9.0) / 24.0 * std::f64::consts::TAU;
            mean + amplitude * phase.sin()
        })
        .collect()
}

/// Hourly lead times in whole hours, `0..hours`.
pub fn lead_hours(hours: usize) -> Vec<i64> {
    (0..hours as i64).collect()
}
