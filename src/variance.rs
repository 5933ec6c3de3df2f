//! Online variance estimation
//!
//! Mean and population standard deviation of a point series in a single
//! forward pass using Welford's method. Only the count, running mean and
//! running sum of squared deviations (M2) are kept.

use crate::series::Point;
use serde::Serialize;

/// Mean and standard deviation of a point series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceResult {
    pub mean: f64,
    pub stddev: f64,
}

impl VarianceResult {
    /// Upper edge of the one-sigma band
    pub fn upper(&self) -> f64 {
        self.mean + self.stddev
    }

    /// Lower edge of the one-sigma band
    pub fn lower(&self) -> f64 {
        self.mean - self.stddev
    }
}

/// Incremental Welford accumulator
#[derive(Debug, Clone, Default)]
pub struct OnlineVariance {
    count: u64,
    mean: f64,
    m2: f64,
}

impl OnlineVariance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one value into the accumulator
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        if self.count > 1 {
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Population variance (M2 / n), `None` before the first value
    pub fn variance(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.m2 / self.count as f64)
        }
    }

    /// Current estimate, `None` when nothing has been pushed
    pub fn result(&self) -> Option<VarianceResult> {
        self.variance().map(|variance| VarianceResult {
            mean: self.mean,
            stddev: variance.sqrt(),
        })
    }
}

/// Compute mean and standard deviation over the values of `points`
///
/// Returns `None` for an empty sequence; callers treat that as "no band to
/// draw".
///
/// # Example
/// ```
/// use peptrend::series::Point;
/// use peptrend::timestamp::Timestamp;
/// use peptrend::variance::online_variance;
///
/// let points = [
///     Point::new(Timestamp::from_millis(0.0), 4.0),
///     Point::new(Timestamp::from_millis(1.0), 6.0),
/// ];
/// let result = online_variance(&points).unwrap();
/// assert_eq!(result.mean, 5.0);
/// assert_eq!(result.stddev, 1.0);
/// ```
pub fn online_variance<'a, I>(points: I) -> Option<VarianceResult>
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut acc = OnlineVariance::new();
    for point in points {
        acc.push(point.value);
    }
    acc.result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;

    fn points(values: &[f64]) -> Vec<Point> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Point::new(Timestamp::from_millis(i as f64), *v))
            .collect()
    }

    #[test]
    fn test_empty_sequence_has_no_result() {
        let empty: Vec<Point> = Vec::new();
        assert!(online_variance(&empty).is_none());
    }

    #[test]
    fn test_single_value_has_zero_stddev() {
        let result = online_variance(&points(&[42.5])).unwrap();
        assert_eq!(result.mean, 42.5);
        assert_eq!(result.stddev, 0.0);
    }

    #[test]
    fn test_population_variance() {
        // mean=5, population variance = 32/8 = 4
        let result = online_variance(&points(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])).unwrap();
        assert!((result.mean - 5.0).abs() < 1e-12);
        assert!((result.stddev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_values() {
        let result = online_variance(&points(&[4.0, 6.0])).unwrap();
        assert_eq!(result.mean, 5.0);
        assert_eq!(result.stddev, 1.0);
        assert_eq!(result.upper(), 6.0);
        assert_eq!(result.lower(), 4.0);
    }

    #[test]
    fn test_constant_values() {
        let result = online_variance(&points(&[3.0; 10])).unwrap();
        assert_eq!(result.mean, 3.0);
        assert_eq!(result.stddev, 0.0);
    }

    #[test]
    fn test_large_offset_stays_stable() {
        // Naive sum-of-squares loses precision here
        let base = 1e9;
        let result = online_variance(&points(&[base + 4.0, base + 7.0, base + 13.0, base + 16.0]))
            .unwrap();
        assert!((result.mean - (base + 10.0)).abs() < 1e-6);
        assert!((result.stddev - 22.5f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_accumulator_count() {
        let mut acc = OnlineVariance::new();
        assert_eq!(acc.count(), 0);
        assert!(acc.variance().is_none());
        acc.push(1.0);
        acc.push(3.0);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.variance(), Some(1.0));
    }
}
