//! Incremental drawdown tracking.
//!
//! Drawdowns are signed fractions: `(value - running_peak) / running_peak`,
//! so they are zero at a new high and negative below it.

/// Drawdown tracker for incremental value updates.
#[derive(Debug, Clone)]
pub struct DrawdownTracker {
    /// Current peak value.
    peak: f64,
    /// Current drawdown (<= 0).
    current_drawdown: f64,
    /// Most negative drawdown seen.
    max_drawdown: f64,
}

impl Default for DrawdownTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawdownTracker {
    /// Create a new drawdown tracker. The first update sets the peak.
    pub fn new() -> Self {
        Self {
            peak: f64::NEG_INFINITY,
            current_drawdown: 0.0,
            max_drawdown: 0.0,
        }
    }

    /// Update with a new value.
    pub fn update(&mut self, value: f64) {
        if value >= self.peak {
            self.peak = value;
            self.current_drawdown = 0.0;
            return;
        }

        self.current_drawdown = if self.peak > 0.0 {
            (value - self.peak) / self.peak
        } else {
            0.0
        };

        if self.current_drawdown < self.max_drawdown {
            self.max_drawdown = self.current_drawdown;
        }
    }

    /// Most negative drawdown as a fraction (0 when never below peak).
    #[inline]
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    #[inline]
    pub fn current_drawdown(&self) -> f64 {
        self.current_drawdown
    }

}

/// Drawdown at every point of a value curve.
pub fn drawdown_curve(values: &[f64]) -> Vec<f64> {
    let mut tracker = DrawdownTracker::new();
    values
        .iter()
        .map(|&v| {
            tracker.update(v);
            tracker.current_drawdown()
        })
        .collect()
}

/// Most negative drawdown of a value curve, 0 for an empty curve.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut tracker = DrawdownTracker::new();
    for &v in values {
        tracker.update(v);
    }
    tracker.max_drawdown()
}
