//! Descriptive statistics backing the exclusion layer and factor extraction.
//!
//! Conventions match the reference tooling the surrounding application was
//! validated against: z-scores use the population standard deviation
//! (ddof = 0), percentiles use linear interpolation between order
//! statistics.

/// Arithmetic mean. Empty input yields NaN.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample median. Even-length samples average the two middle order
/// statistics. Empty input yields NaN.
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Population z-scores (ddof = 0) for each value.
///
/// Returns `None` when the sample has fewer than 2 values or zero variance;
/// a z-score threshold can exclude nothing in either case.
pub fn zscores(data: &[f64]) -> Option<Vec<f64>> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data);
    let var = data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    let std = var.sqrt();
    if std == 0.0 {
        return None;
    }
    Some(data.iter().map(|x| (x - m) / std).collect())
}

/// Percent deviation of each value from the sample median:
/// `|x - median| / median * 100`.
///
/// Returns `None` for an empty sample or a zero median (the ratio is
/// undefined there and no trial can be judged against it).
pub fn percent_deviation_from_median(data: &[f64]) -> Option<Vec<f64>> {
    if data.is_empty() {
        return None;
    }
    let med = median(data);
    if med == 0.0 || !med.is_finite() {
        return None;
    }
    Some(data.iter().map(|x| (x - med).abs() / med * 100.0).collect())
}

/// Percentile with linear interpolation between order statistics:
/// `h = (n-1) * p / 100`, interpolating between `floor(h)` and `ceil(h)`.
///
/// `p` must be in [0, 100]. Empty input yields NaN.
pub fn percentile(data: &[f64], p: f64) -> f64 {
    assert!((0.0..=100.0).contains(&p), "percentile must be in [0, 100]");
    if data.is_empty() {
        return f64::NAN;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let h = (n - 1) as f64 * p / 100.0;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Interquartile range: 75th minus 25th percentile. Empty input yields NaN.
pub fn iqr(data: &[f64]) -> f64 {
    percentile(data, 75.0) - percentile(data, 25.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_median() {
        assert_eq!(mean(&[200.0, 300.0, 400.0]), 300.0);
        assert_eq!(median(&[200.0, 300.0, 400.0]), 300.0);
        assert_eq!(median(&[200.0, 300.0, 400.0, 500.0]), 350.0);
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn zscores_population_convention() {
        // Sample [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, population std 2.
        let z = zscores(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((z[0] - (-1.5)).abs() < 1e-12);
        assert!((z[7] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zscores_degenerate_inputs() {
        assert!(zscores(&[300.0]).is_none());
        assert!(zscores(&[300.0, 300.0, 300.0]).is_none());
    }

    #[test]
    fn percent_deviation() {
        let dev = percent_deviation_from_median(&[180.0, 200.0, 260.0]).unwrap();
        assert!((dev[0] - 10.0).abs() < 1e-12);
        assert!((dev[1] - 0.0).abs() < 1e-12);
        assert!((dev[2] - 30.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_linear_interpolation() {
        let data = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&data, 0.0), 10.0);
        assert_eq!(percentile(&data, 100.0), 40.0);
        assert_eq!(percentile(&data, 50.0), 25.0);
        assert!((percentile(&data, 25.0) - 17.5).abs() < 1e-12);
    }

    #[test]
    fn iqr_matches_quartiles() {
        let data = [10.0, 20.0, 30.0, 40.0];
        assert!((iqr(&data) - 15.0).abs() < 1e-12);
    }
}
