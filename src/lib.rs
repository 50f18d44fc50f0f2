//! Game-state engine for a falling-pair colour matching puzzle.
//!
//! Pairs of tokens fall into a grid; four or more same-kind tokens touching
//! orthogonally vanish, the stack settles, and the settle may set off further
//! matches (a chain). The engine has no clock and no I/O: callers feed it
//! elapsed time through [`Session::tick`] and player intents through the
//! `handle_*` methods, then read the state back for drawing.
//!
//! - [`grid`]: cell matrix
//! - [`piece`]: the falling pair
//! - [`movement`]: collision, translation, rotation with wall kicks
//! - [`chain`]: flood-fill match detection and scoring
//! - [`gravity`]: settling after removal
//! - [`sequencer`]: vanish / settle / delay / re-check state machine
//! - [`session`]: ties it all together
//!
//! ```
//! use std::time::Duration;
//! use puyotui::{Direction, EngineConfig, Session};
//!
//! let mut session = Session::with_seed(EngineConfig::default(), 7).unwrap();
//! session.handle_move(Direction::Left);
//! session.handle_rotate();
//! session.tick(Duration::from_millis(16));
//! assert_eq!(session.score(), 0);
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod gravity;
pub mod grid;
pub mod logging;
pub mod movement;
pub mod piece;
pub mod sequencer;
pub mod session;

pub use chain::{ChainPass, MatchGroup};
pub use config::{Difficulty, EngineConfig};
pub use error::ConfigError;
pub use grid::{Grid, TokenKind};
pub use piece::Piece;
pub use sequencer::{ChainPhase, SequencerEvent};
pub use session::{Direction, Session};
