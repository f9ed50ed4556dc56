// Population statistics over f64 samples

/// Arithmetic mean, 0.0 for no samples
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance, 0.0 for no samples
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation, 0.0 for no samples
#[inline]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Largest sample, 0.0 for no samples
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Counts per equal-width bin over `[min, max]`
///
/// The bin index is `floor((v - min) / width)` clamped to the last bin, so
/// values at or above `max` land in the last bin. Values below `min` are
/// dropped.
pub fn histogram(values: &[f64], bins: usize, min: f64, max: f64) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return counts;
    }
    let width = (max - min) / bins as f64;
    for &v in values {
        let offset = (v - min) / width;
        if offset < 0.0 || offset.is_nan() {
            continue;
        }
        let bin = (offset.floor() as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
}

/// [`histogram`] divided by the number of samples
pub fn normalized_histogram(values: &[f64], bins: usize, min: f64, max: f64) -> Vec<f64> {
    let total = values.len();
    histogram(values, bins, min, max)
        .into_iter()
        .map(|count| if total == 0 { 0.0 } else { count as f64 / total as f64 })
        .collect()
}
