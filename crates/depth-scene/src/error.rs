//! Error types.

use thiserror::Error;

/// A [`SceneConfig`](crate::SceneConfig) value that cannot be used.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tolerance `{name}` must be finite and non-negative, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("line scale must be finite and positive, got {0}")]
    InvalidLineScale(f64),

    #[error("iteration limit must be at least 1")]
    ZeroIterationLimit,
}

/// A render mode name that is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown render mode `{0}`, expected `painters` or `bsp`")]
pub struct ParseModeError(pub String);
