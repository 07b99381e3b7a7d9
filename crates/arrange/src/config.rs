//! Arranger configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a finished bin is aligned within the bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alignment {
    /// Translate the finished pile so its bounding-box center coincides
    /// with the bin center.
    #[default]
    Center,
    /// Leave every part where the placer committed it. Selected
    /// automatically when fixed parts are preloaded, since those must not
    /// move.
    DontAlign,
}

/// Placement configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrangeConfig {
    /// Fraction of candidate boundary vertices that are evaluated,
    /// 0.0 – 1.0. Scales quality against run time.
    pub accuracy: f64,

    /// Allowed part rotations in radians.
    // TODO: enable more rotations once identical parts with differing
    // rotations survive the host round trip.
    pub rotations: Vec<f64>,

    /// Final pile alignment mode.
    pub alignment: Alignment,

    /// Evaluate placement candidates in parallel.
    pub parallel: bool,
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            accuracy: 0.65,
            rotations: vec![0.0],
            alignment: Alignment::Center,
            parallel: true,
        }
    }
}

impl ArrangeConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidate sampling accuracy (clamped to 0.05 – 1.0).
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy.clamp(0.05, 1.0);
        self
    }

    /// Sets the allowed rotations.
    pub fn with_rotations(mut self, rotations: Vec<f64>) -> Self {
        self.rotations = rotations;
        self
    }

    /// Sets the alignment mode.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Enables or disables the parallel candidate sweep.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ArrangeConfig::new();
        assert_eq!(cfg.accuracy, 0.65);
        assert_eq!(cfg.rotations, vec![0.0]);
        assert_eq!(cfg.alignment, Alignment::Center);
        assert!(cfg.parallel);
    }

    #[test]
    fn test_accuracy_clamped() {
        assert_eq!(ArrangeConfig::new().with_accuracy(2.0).accuracy, 1.0);
        assert_eq!(ArrangeConfig::new().with_accuracy(0.0).accuracy, 0.05);
    }
}
