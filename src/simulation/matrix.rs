//! Dense storage for a simulated path ensemble.

use crate::core::error::{QuantaError, Result};

/// Simulated values indexed `[day][simulation]`.
///
/// Storage is path-contiguous: each simulation's full path is one slice, which
/// is what both the parallel simulator and per-path drawdown scans want.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    days: usize,
    simulations: usize,
    data: Vec<f64>,
}

impl PathMatrix {
    /// Wrap path-contiguous data of `simulations` paths with `days` values each.
    pub fn new(days: usize, simulations: usize, data: Vec<f64>) -> Result<Self> {
        if days == 0 || simulations == 0 {
            return Err(QuantaError::empty_data("path matrix"));
        }
        let cells = days.checked_mul(simulations).ok_or_else(|| {
            QuantaError::invalid_parameter(format!(
                "path matrix of {} days by {} simulations overflows",
                days, simulations
            ))
        })?;
        if data.len() != cells {
            return Err(QuantaError::invalid_parameter(format!(
                "path matrix expects {} cells, got {}",
                cells,
                data.len()
            )));
        }
        Ok(Self {
            days,
            simulations,
            data,
        })
    }

    /// Build from one vector per simulation; all paths must share a length.
    pub fn from_paths(paths: Vec<Vec<f64>>) -> Result<Self> {
        let simulations = paths.len();
        let days = paths.first().map(Vec::len).unwrap_or(0);
        if paths.iter().any(|p| p.len() != days) {
            return Err(QuantaError::invalid_parameter("paths have different lengths"));
        }
        Self::new(days, simulations, paths.concat())
    }

    #[inline]
    pub fn trading_days(&self) -> usize {
        self.days
    }

    #[inline]
    pub fn num_simulations(&self) -> usize {
        self.simulations
    }

    /// Value on `day` of simulation `sim`.
    #[inline]
    pub fn get(&self, day: usize, sim: usize) -> f64 {
        self.data[sim * self.days + day]
    }

    /// Full path of one simulation.
    #[inline]
    pub fn path(&self, sim: usize) -> &[f64] {
        &self.data[sim * self.days..(sim + 1) * self.days]
    }

    /// Iterator over all paths in simulation order.
    pub fn paths(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.days)
    }

    /// Cross-section of all simulations on `day`.
    pub fn row(&self, day: usize) -> Vec<f64> {
        self.paths().map(|p| p[day]).collect()
    }

    /// Values on the last simulated day.
    pub fn final_values(&self) -> Vec<f64> {
        self.row(self.days - 1)
    }

    /// Raw path-contiguous cells.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing() {
        let m = PathMatrix::from_paths(vec![vec![1.0, 2.0, 3.0], vec![1.0, 4.0, 9.0]]).unwrap();

        assert_eq!(m.trading_days(), 3);
        assert_eq!(m.num_simulations(), 2);
        assert_eq!(m.get(1, 1), 4.0);
        assert_eq!(m.row(0), vec![1.0, 1.0]);
        assert_eq!(m.final_values(), vec![3.0, 9.0]);
        assert_eq!(m.path(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.paths().count(), 2);
    }

    #[test]
    fn test_shape_validation() {
        assert!(PathMatrix::new(0, 1, vec![]).is_err());
        assert!(PathMatrix::new(2, 2, vec![1.0; 3]).is_err());
        assert!(PathMatrix::from_paths(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(PathMatrix::from_paths(vec![]).is_err());
    }
}
