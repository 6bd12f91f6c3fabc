//! Scene configuration: tolerances and safety limits.

use crate::ConfigError;

/// Numeric tolerances used by the ordering algorithms.
///
/// `plane_epsilon`, `intersection_epsilon` and `depth_epsilon` are relative:
/// at render time they are multiplied by the size of the scene in view space
/// (largest bounding-box side, or depth span for `depth_epsilon`), so the
/// same configuration works for scenes measured in microns or kilometres.
/// `screen_epsilon` is absolute, in screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Distance below which a point counts as lying on a plane.
    pub plane_epsilon: f64,
    /// Minimum length two polygons must share along their common line to
    /// count as interpenetrating. Shorter contacts are treated as touching.
    pub intersection_epsilon: f64,
    /// Depth difference below which two depths are considered equal.
    pub depth_epsilon: f64,
    /// Minimum overlap of two screen footprints for them to interact.
    pub screen_epsilon: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            plane_epsilon: 1e-7,
            intersection_epsilon: 1e-6,
            depth_epsilon: 1e-7,
            screen_epsilon: 1e-6,
        }
    }
}

impl Tolerances {
    /// Checks every tolerance is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("plane_epsilon", self.plane_epsilon),
            ("intersection_epsilon", self.intersection_epsilon),
            ("depth_epsilon", self.depth_epsilon),
            ("screen_epsilon", self.screen_epsilon),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

/// Configuration of a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub tolerances: Tolerances,
    /// How many times a fragment lineage may be split. Pairs whose pieces
    /// reach this depth are ordered by the fine depth comparison instead.
    pub max_split_depth: u32,
    /// Upper bound on ordering steps per render in BSP mode. When reached,
    /// the order built so far is used as is.
    pub max_iterations: usize,
    /// Multiplier for stroke widths and marker sizes.
    pub line_scale: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            max_split_depth: 8,
            max_iterations: 250_000,
            line_scale: 1.0,
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the numeric tolerances.
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Sets the split depth limit.
    pub fn with_max_split_depth(mut self, depth: u32) -> Self {
        self.max_split_depth = depth;
        self
    }

    /// Sets the ordering step limit.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the line width scale factor.
    pub fn with_line_scale(mut self, scale: f64) -> Self {
        self.line_scale = scale;
        self
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tolerances.validate()?;
        if !self.line_scale.is_finite() || self.line_scale <= 0.0 {
            return Err(ConfigError::InvalidLineScale(self.line_scale));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterationLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SceneConfig::default().validate(), Ok(()));
    }

    #[test]
    fn builder_sets_fields() {
        let config = SceneConfig::new()
            .with_max_split_depth(2)
            .with_max_iterations(10)
            .with_line_scale(0.5);
        assert_eq!(config.max_split_depth, 2);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.line_scale, 0.5);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_tol = SceneConfig::new().with_tolerances(Tolerances {
            depth_epsilon: -1.0,
            ..Tolerances::default()
        });
        assert_eq!(
            bad_tol.validate(),
            Err(ConfigError::InvalidTolerance {
                name: "depth_epsilon",
                value: -1.0
            })
        );

        let nan_scale = SceneConfig::new().with_line_scale(f64::NAN);
        assert!(matches!(
            nan_scale.validate(),
            Err(ConfigError::InvalidLineScale(_))
        ));

        let zero_iter = SceneConfig::new().with_max_iterations(0);
        assert_eq!(zero_iter.validate(), Err(ConfigError::ZeroIterationLimit));
    }
}
