//! Configuration errors surfaced before a session starts.

use thiserror::Error;

use crate::config::Difficulty;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{difficulty} needs {required} token kinds but only {available} are available")]
    NotEnoughTokenKinds {
        difficulty: Difficulty,
        required: usize,
        available: usize,
    },
    #[error("grid {width}x{height} is too small to spawn a pair (need at least 2x2)")]
    GridTooSmall { width: usize, height: usize },
    #[error("vanish threshold must be at least 2, got {0}")]
    ThresholdTooLow(usize),
    #[error("fall interval must be non-zero")]
    ZeroFallInterval,
    #[error("grid is {actual_width}x{actual_height} but the config expects {width}x{height}")]
    GridMismatch {
        width: usize,
        height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}
