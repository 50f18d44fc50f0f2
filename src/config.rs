//! Engine configuration: difficulty table, grid size and timings.

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;

use crate::error::ConfigError;

pub const DEFAULT_WIDTH: usize = 6;
pub const DEFAULT_HEIGHT: usize = 12;
/// Minimum connected-group size that vanishes.
pub const VANISH_THRESHOLD: usize = 4;
/// Points awarded per vanished token.
pub const POINTS_PER_TOKEN: u64 = 10;

pub const FALL_INTERVAL: Duration = Duration::from_millis(500);
pub const VANISH_DURATION: Duration = Duration::from_millis(300);
pub const CHAIN_DELAY: Duration = Duration::from_millis(500);

/// Selects how many distinct token kinds are dealt into pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// Number of token kinds eligible for piece generation.
    pub const fn token_kinds(self) -> usize {
        match self {
            Self::Beginner => 4,
            Self::Intermediate => 6,
            Self::Advanced => 20,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// 1-based menu slot: `1` beginner, `2` intermediate, `3` advanced.
    pub const fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(Self::Beginner),
            2 => Some(Self::Intermediate),
            3 => Some(Self::Advanced),
            _ => None,
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate => Self::Advanced,
            Self::Advanced => Self::Beginner,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Beginner => Self::Advanced,
            Self::Intermediate => Self::Beginner,
            Self::Advanced => Self::Intermediate,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable parameters handed to [`crate::Session`] at construction.
///
/// `available_token_kinds` is how many distinct token kinds the consumer can
/// actually present (palette entries, sprites, ...). A difficulty asking for
/// more kinds than that is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub difficulty: Difficulty,
    pub available_token_kinds: usize,
    pub vanish_threshold: usize,
    pub fall_interval: Duration,
    pub vanish_duration: Duration,
    pub chain_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            difficulty: Difficulty::default(),
            available_token_kinds: Difficulty::Advanced.token_kinds(),
            vanish_threshold: VANISH_THRESHOLD,
            fall_interval: FALL_INTERVAL,
            vanish_duration: VANISH_DURATION,
            chain_delay: CHAIN_DELAY,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Token kinds dealt into pieces under the current difficulty.
    pub const fn token_kinds(&self) -> usize {
        self.difficulty.token_kinds()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.vanish_threshold < 2 {
            return Err(ConfigError::ThresholdTooLow(self.vanish_threshold));
        }
        if self.fall_interval.is_zero() {
            return Err(ConfigError::ZeroFallInterval);
        }
        let required = self.token_kinds();
        if self.available_token_kinds < required {
            return Err(ConfigError::NotEnoughTokenKinds {
                difficulty: self.difficulty,
                required,
                available: self.available_token_kinds,
            });
        }
        Ok(())
    }
}
