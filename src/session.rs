//! Game session: owns the grid, the falling pair, the chain sequencer and
//! all counters. Driven only by `tick` and the `handle_*` inputs.

use std::mem;
use std::time::Duration;

use log::{debug, info};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::config::{Difficulty, EngineConfig};
use crate::error::ConfigError;
use crate::gravity;
use crate::grid::Grid;
use crate::movement;
use crate::piece::Piece;
use crate::sequencer::{ChainPhase, ChainSequencer, ChainTiming, SequencerEvent};

/// Player translation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    /// Soft drop by one row. A blocked soft drop does not lock the piece.
    Down,
}

impl Direction {
    const fn delta(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
        }
    }
}

/// One game in progress. `R` is the piece randomiser; any seedable RNG can
/// be injected through [`Session::with_rng`] for reproducible games.
#[derive(Debug, Clone)]
pub struct Session<R = Pcg32> {
    config: EngineConfig,
    grid: Grid,
    current: Piece,
    next: Piece,
    score: u64,
    /// Length of the most recent chain; cleared when the next piece locks.
    last_chain: u32,
    sequencer: ChainSequencer,
    fall_elapsed: Duration,
    game_over: bool,
    paused: bool,
    rng: R,
}

impl Session<Pcg32> {
    /// New session seeded from the thread RNG.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, Pcg32::from_rng(&mut rand::rng()))
    }

    /// New session whose piece sequence is fully determined by `seed`.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(config: EngineConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let current = Piece::random(config.width, config.token_kinds(), &mut rng);
        let next = Piece::random(config.width, config.token_kinds(), &mut rng);
        let grid = Grid::new(config.width, config.height);
        Ok(Self::from_parts(config, rng, grid, current, next))
    }

    /// Session starting from a prepared position, e.g. a puzzle or a replay
    /// checkpoint. The grid must match the configured size.
    pub fn with_state(
        config: EngineConfig,
        rng: R,
        grid: Grid,
        current: Piece,
        next: Piece,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.width() != config.width || grid.height() != config.height {
            return Err(ConfigError::GridMismatch {
                width: config.width,
                height: config.height,
                actual_width: grid.width(),
                actual_height: grid.height(),
            });
        }
        Ok(Self::from_parts(config, rng, grid, current, next))
    }

    fn from_parts(config: EngineConfig, rng: R, grid: Grid, current: Piece, next: Piece) -> Self {
        let sequencer = ChainSequencer::new(ChainTiming::from(&config));
        Self {
            config,
            grid,
            current,
            next,
            score: 0,
            last_chain: 0,
            sequencer,
            fall_elapsed: Duration::ZERO,
            game_over: false,
            paused: false,
            rng,
        }
    }

    // --- queries ---

    #[inline]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub const fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    #[inline]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub const fn current_piece(&self) -> &Piece {
        &self.current
    }

    #[inline]
    pub const fn next_piece(&self) -> &Piece {
        &self.next
    }

    #[inline]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Running chain counter; 0 while no chain is in progress.
    #[inline]
    pub const fn chain_count(&self) -> u32 {
        self.sequencer.chain()
    }

    /// Links reached by the latest chain, kept for display until the next
    /// piece locks.
    #[inline]
    pub const fn last_chain(&self) -> u32 {
        self.last_chain
    }

    #[inline]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub const fn phase(&self) -> &ChainPhase {
        self.sequencer.phase()
    }

    pub fn vanish_progress(&self) -> Option<f32> {
        self.sequencer.vanish_progress()
    }

    /// True when the falling piece is under player control.
    pub const fn accepts_piece_input(&self) -> bool {
        !self.game_over && !self.paused && self.sequencer.is_idle()
    }

    // --- time ---

    /// Advance the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if self.game_over || self.paused {
            return;
        }
        if !self.sequencer.is_idle() {
            let event = self.sequencer.step(dt, &mut self.grid);
            self.apply_event(event);
            return;
        }
        self.fall_elapsed += dt;
        if self.fall_elapsed >= self.config.fall_interval {
            self.fall_elapsed = Duration::ZERO;
            if !movement::try_move(&self.grid, &mut self.current, 0, 1) {
                self.lock_piece();
            }
        }
    }

    // --- input ---

    pub fn handle_move(&mut self, direction: Direction) -> bool {
        if !self.accepts_piece_input() {
            return false;
        }
        let (dx, dy) = direction.delta();
        movement::try_move(&self.grid, &mut self.current, dx, dy)
    }

    pub fn handle_rotate(&mut self) -> bool {
        if !self.accepts_piece_input() {
            return false;
        }
        movement::try_rotate(&self.grid, &mut self.current)
    }

    /// Toggle pause. Ignored once the game is over.
    pub fn handle_pause_toggle(&mut self) {
        if !self.game_over {
            self.paused = !self.paused;
            debug!("paused: {}", self.paused);
        }
    }

    /// Start over with the same configuration. Ignored while paused.
    pub fn handle_restart(&mut self) {
        if self.paused {
            return;
        }
        info!("restart at {} (score was {})", self.config.difficulty, self.score);
        self.reset();
    }

    /// Switch difficulty and start over. Returns `Ok(false)` if ignored
    /// because the game is paused; the session is untouched on error.
    pub fn handle_difficulty_change(&mut self, difficulty: Difficulty) -> Result<bool, ConfigError> {
        if self.paused {
            return Ok(false);
        }
        let config = self.config.clone().with_difficulty(difficulty);
        config.validate()?;
        info!("difficulty {} -> {}", self.config.difficulty, difficulty);
        self.config = config;
        self.reset();
        Ok(true)
    }

    // --- internals ---

    fn reset(&mut self) {
        let kinds = self.config.token_kinds();
        self.grid = Grid::new(self.config.width, self.config.height);
        self.current = Piece::random(self.config.width, kinds, &mut self.rng);
        self.next = Piece::random(self.config.width, kinds, &mut self.rng);
        self.score = 0;
        self.last_chain = 0;
        self.sequencer = ChainSequencer::new(ChainTiming::from(&self.config));
        self.fall_elapsed = Duration::ZERO;
        self.game_over = false;
        self.paused = false;
    }

    /// Freeze the current piece into the grid, start the chain check, and
    /// promote the next piece.
    fn lock_piece(&mut self) {
        for ((x, y), kind) in self.current.placed() {
            if self.grid.contains(x, y) {
                self.grid.set(x as usize, y as usize, Some(kind));
            }
        }
        // A pair locked half over a gap splits; the hanging half drops.
        gravity::compact_columns(&mut self.grid);
        debug!("locked {:?}", self.current.placed());

        self.last_chain = 0;
        let event = self.sequencer.begin(&self.grid);
        self.apply_event(event);

        let incoming = Piece::random(self.config.width, self.config.token_kinds(), &mut self.rng);
        self.current = mem::replace(&mut self.next, incoming);

        let blocked = self
            .current
            .cells()
            .iter()
            .any(|&(x, y)| self.grid.contains(x, y) && !self.grid.is_vacant(x as usize, y as usize));
        if blocked {
            self.game_over = true;
            info!("game over: score {}", self.score);
        }
    }

    fn apply_event(&mut self, event: Option<SequencerEvent>) {
        match event {
            Some(SequencerEvent::ChainStarted { chain, pass }) => {
                self.score += pass.score_delta;
                self.last_chain = chain;
            }
            Some(SequencerEvent::ChainFinished { length }) => {
                debug!("chain of {length} complete, score {}", self.score);
            }
            Some(SequencerEvent::Settled { .. }) | None => {}
        }
    }
}
