//! Streaming moments using Welford's algorithm.
//!
//! Single pass, numerically stable mean and variance. A constant input stream
//! yields exactly zero variance, which keeps the zero-volatility branches of
//! the Sharpe calculations exact.

/// Running mean/variance/min/max accumulator.
#[derive(Debug, Clone)]
pub struct RunningStats {
    /// Number of observations.
    count: usize,
    /// Running mean.
    mean: f64,
    /// Running sum of squared deviations.
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Build from a slice in one pass.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut stats = Self::new();
        for &v in values {
            stats.update(v);
        }
        stats
    }

    /// Add one observation.
    pub fn update(&mut self, value: f64) {
        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean (0 when empty).
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (n - 1 denominator).
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    /// Population variance (n denominator).
    pub fn variance_population(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.m2 / self.count as f64
    }

    /// Sample standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Population standard deviation.
    pub fn std_dev_population(&self) -> f64 {
        self.variance_population().sqrt()
    }

    /// Smallest observation, NaN when empty.
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.min
        }
    }

    /// Largest observation, NaN when empty.
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let stats = RunningStats::from_slice(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);

        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-12);
        assert!((stats.std_dev_population() - 2.0).abs() < 1e-12);
        assert!((stats.variance() - 32.0 / 7.0).abs() < 1e-12);
        assert!((stats.min() - 2.0).abs() < f64::EPSILON);
        assert!((stats.max() - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constant_stream_has_zero_variance() {
        let stats = RunningStats::from_slice(&[0.001; 500]);
        assert_eq!(stats.variance(), 0.0);
        assert_eq!(stats.variance_population(), 0.0);
    }

    #[test]
    fn test_empty_and_single() {
        let empty = RunningStats::new();
        assert_eq!(empty.variance(), 0.0);
        assert!(empty.min().is_nan());

        let single = RunningStats::from_slice(&[3.0]);
        assert_eq!(single.variance(), 0.0);
        assert_eq!(single.std_dev_population(), 0.0);
    }
}
