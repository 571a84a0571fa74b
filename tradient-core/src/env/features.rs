//! Observation features computed over price/volume windows.

/// Z-score of the last element of `window` against the window's mean and
/// population standard deviation.
///
/// Returns NaN or infinity for degenerate windows (zero spread); callers
/// zero non-finite features.
pub fn zscore_last(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let var = window.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (window[window.len() - 1] - mean) / var.sqrt()
}

/// Ordinary least squares of `data` against the index `0..n`.
///
/// Returns `(slope, r_value)` where `r_value` is the Pearson correlation
/// coefficient.
fn linregress(data: &[f64]) -> (f64, f64) {
    let n = data.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = data.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (i, y) in data.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let r_value = sxy / (sxx * syy).sqrt();
    (slope, r_value)
}

/// Trend-strength score of a window: `(1 + slope) * r_value^2` of a
/// linear regression against the index, rewarding both direction and fit
/// quality.
pub fn trend_strength(window: &[f64]) -> f64 {
    let (slope, r_value) = linregress(window);
    (1.0 + slope) * (r_value * r_value)
}

/// Trend-strength score of the log of a window, i.e. a log-linear
/// regression against the index.
pub fn log_trend_strength(window: &[f64]) -> f64 {
    let log_c: Vec<f64> = window.iter().map(|x| x.ln()).collect();
    trend_strength(&log_c)
}

/// Maps the magnitude of a raw action onto a trade-size scale:
/// `round(x / 0.95 - 0.05264, 3)`.
///
/// The affine part maps the `[0.05, 1.0]` action band onto roughly
/// `[0, 1]`; callers clip the result.
pub fn normalize(x: f64) -> f64 {
    round3(x / 0.95 - 0.05264)
}

/// Rounds to three decimal places.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
