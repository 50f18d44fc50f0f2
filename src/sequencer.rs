//! Chain sequencing: vanish, settle, wait, re-check, as a tagged state
//! machine driven purely by caller-supplied time deltas.

use std::mem;
use std::time::Duration;

use log::debug;

use crate::chain::{self, ChainPass};
use crate::config::EngineConfig;
use crate::gravity;
use crate::grid::Grid;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChainPhase {
    /// No chain in progress; the session drives the falling piece.
    #[default]
    Idle,
    /// Matched cells are fading out; removed when `elapsed` reaches the
    /// vanish duration.
    Vanishing {
        elapsed: Duration,
        cells: Vec<(usize, usize)>,
    },
    /// Removal done, tokens falling. Never outlives a single step.
    Settling,
    /// Grid settled; waiting before looking for the next link.
    InterChainDelay { elapsed: Duration },
}

impl ChainPhase {
    #[inline]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// What a call into the sequencer produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// A detection pass matched; `chain` is the 1-based link number. The
    /// pass's score is to be credited exactly once, now.
    ChainStarted { chain: u32, pass: ChainPass },
    /// Vanished cells were removed and the grid settled.
    Settled { gravity_passes: usize },
    /// The last re-check found nothing; `length` links were played.
    ChainFinished { length: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTiming {
    pub vanish_duration: Duration,
    pub chain_delay: Duration,
    pub threshold: usize,
}

impl From<&EngineConfig> for ChainTiming {
    fn from(config: &EngineConfig) -> Self {
        Self {
            vanish_duration: config.vanish_duration,
            chain_delay: config.chain_delay,
            threshold: config.vanish_threshold,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainSequencer {
    phase: ChainPhase,
    chain: u32,
    timing: ChainTiming,
}

impl ChainSequencer {
    pub const fn new(timing: ChainTiming) -> Self {
        Self {
            phase: ChainPhase::Idle,
            chain: 0,
            timing,
        }
    }

    #[inline]
    pub const fn phase(&self) -> &ChainPhase {
        &self.phase
    }

    #[inline]
    pub const fn is_idle(&self) -> bool {
        self.phase.is_idle()
    }

    /// Links matched so far in the running sequence; 0 while idle.
    #[inline]
    pub const fn chain(&self) -> u32 {
        self.chain
    }

    /// Fade progress of the current vanish in `0.0..=1.0`, if vanishing.
    pub fn vanish_progress(&self) -> Option<f32> {
        match &self.phase {
            ChainPhase::Vanishing { elapsed, .. } => {
                let total = self.timing.vanish_duration.as_secs_f32();
                Some(if total > 0.0 {
                    (elapsed.as_secs_f32() / total).min(1.0)
                } else {
                    1.0
                })
            }
            _ => None,
        }
    }

    /// Called right after a piece locks. Runs one detection pass; on a match
    /// the sequence starts at link 1, otherwise the sequencer stays idle.
    pub fn begin(&mut self, grid: &Grid) -> Option<SequencerEvent> {
        if !self.is_idle() {
            debug!("begin ignored: sequencer busy in {:?}", self.phase);
            return None;
        }
        self.chain = 0;
        self.detect(grid)
    }

    /// Advance timers by `dt`. At most one timer expires per call.
    pub fn step(&mut self, dt: Duration, grid: &mut Grid) -> Option<SequencerEvent> {
        let phase = mem::take(&mut self.phase);
        let (phase, event) = self.advance(phase, dt, grid);
        self.phase = phase;
        event
    }

    fn advance(
        &mut self,
        phase: ChainPhase,
        dt: Duration,
        grid: &mut Grid,
    ) -> (ChainPhase, Option<SequencerEvent>) {
        match phase {
            ChainPhase::Idle => (ChainPhase::Idle, None),
            ChainPhase::Vanishing { elapsed, cells } => {
                let elapsed = elapsed + dt;
                if elapsed < self.timing.vanish_duration {
                    return (ChainPhase::Vanishing { elapsed, cells }, None);
                }
                for &(x, y) in &cells {
                    grid.set(x, y, None);
                }
                self.advance(ChainPhase::Settling, Duration::ZERO, grid)
            }
            ChainPhase::Settling => {
                let gravity_passes = gravity::settle(grid);
                gravity::compact_columns(grid);
                (
                    ChainPhase::InterChainDelay {
                        elapsed: Duration::ZERO,
                    },
                    Some(SequencerEvent::Settled { gravity_passes }),
                )
            }
            ChainPhase::InterChainDelay { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed < self.timing.chain_delay {
                    return (ChainPhase::InterChainDelay { elapsed }, None);
                }
                self.phase = ChainPhase::Idle;
                let event = self.detect(grid);
                (mem::take(&mut self.phase), event)
            }
        }
    }

    /// Run the detector on an idle sequencer and enter `Vanishing` on a match.
    fn detect(&mut self, grid: &Grid) -> Option<SequencerEvent> {
        let pass = chain::find_matches(grid, self.timing.threshold);
        if pass.is_empty() {
            let length = mem::take(&mut self.chain);
            if length == 0 {
                return None;
            }
            debug!("chain finished after {length} link(s)");
            return Some(SequencerEvent::ChainFinished { length });
        }
        self.chain += 1;
        debug!(
            "chain link {}: {} group(s), {} token(s), +{}",
            self.chain,
            pass.groups.len(),
            pass.token_count(),
            pass.score_delta
        );
        self.phase = ChainPhase::Vanishing {
            elapsed: Duration::ZERO,
            cells: pass.cells(),
        };
        Some(SequencerEvent::ChainStarted {
            chain: self.chain,
            pass,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VANISH: Duration = Duration::from_millis(300);
    const DELAY: Duration = Duration::from_millis(500);

    fn sequencer() -> ChainSequencer {
        ChainSequencer::new(ChainTiming {
            vanish_duration: VANISH,
            chain_delay: DELAY,
            threshold: 4,
        })
    }

    /// Step through the whole sequence, returning every event and the score.
    fn run_to_idle(seq: &mut ChainSequencer, grid: &mut Grid) -> (Vec<SequencerEvent>, u64) {
        let mut events = Vec::new();
        let mut score = 0;
        for _ in 0..1000 {
            if seq.is_idle() {
                break;
            }
            if let Some(event) = seq.step(Duration::from_millis(50), grid) {
                if let SequencerEvent::ChainStarted { pass, .. } = &event {
                    score += pass.score_delta;
                }
                events.push(event);
            }
        }
        (events, score)
    }

    #[test]
    fn test_no_match_stays_idle() {
        let grid = Grid::from_rows(&["....", "0...", "00.."]);
        let mut seq = sequencer();
        assert_eq!(seq.begin(&grid), None);
        assert!(seq.is_idle());
        assert_eq!(seq.chain(), 0);
    }

    #[test]
    fn test_single_match_runs_one_link() {
        let mut grid = Grid::from_rows(&["....", "0...", "0001"]);
        let mut seq = sequencer();
        let Some(SequencerEvent::ChainStarted { chain, pass }) = seq.begin(&grid) else {
            panic!("expected a match");
        };
        assert_eq!(chain, 1);
        assert_eq!(pass.score_delta, 40);
        assert!(matches!(seq.phase(), ChainPhase::Vanishing { .. }));

        let (events, _) = run_to_idle(&mut seq, &mut grid);
        assert_eq!(
            events.last(),
            Some(&SequencerEvent::ChainFinished { length: 1 })
        );
        assert_eq!(seq.chain(), 0);
        assert_eq!(grid, Grid::from_rows(&["....", "....", "...1"]));
    }

    #[test]
    fn test_vanish_waits_for_full_duration() {
        let mut grid = Grid::from_rows(&["....", "0...", "000."]);
        let mut seq = sequencer();
        seq.begin(&grid);
        assert_eq!(seq.step(Duration::from_millis(299), &mut grid), None);
        assert_eq!(grid.occupied_count(), 4);
        assert_eq!(seq.vanish_progress().map(|p| p > 0.99), Some(true));

        let event = seq.step(Duration::from_millis(1), &mut grid);
        assert!(matches!(event, Some(SequencerEvent::Settled { .. })));
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(
            seq.phase(),
            &ChainPhase::InterChainDelay {
                elapsed: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_delay_then_recheck() {
        let mut grid = Grid::from_rows(&["....", "0...", "000."]);
        let mut seq = sequencer();
        seq.begin(&grid);
        seq.step(VANISH, &mut grid);
        assert_eq!(seq.step(Duration::from_millis(499), &mut grid), None);
        assert!(!seq.is_idle());
        assert_eq!(
            seq.step(Duration::from_millis(1), &mut grid),
            Some(SequencerEvent::ChainFinished { length: 1 })
        );
        assert!(seq.is_idle());
    }

    #[test]
    fn test_cascade_counts_two_links() {
        // Removing the 0s drops the 1 at the top onto three other 1s.
        let mut grid = Grid::from_rows(&[
            "1...", //
            "0...", //
            "0...", //
            "00..", //
            "111.",
        ]);
        let mut seq = sequencer();
        let first = seq.begin(&grid);
        let Some(SequencerEvent::ChainStarted { pass, .. }) = first else {
            panic!("expected first link");
        };
        let (events, score) = run_to_idle(&mut seq, &mut grid);
        let total = pass.score_delta + score;

        let links: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                SequencerEvent::ChainStarted { chain, .. } => Some(*chain),
                _ => None,
            })
            .collect();
        assert_eq!(links, vec![2]);
        assert_eq!(
            events.last(),
            Some(&SequencerEvent::ChainFinished { length: 2 })
        );
        assert_eq!(total, (4 + 4) * 10);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_simultaneous_groups_are_one_link() {
        let mut grid = Grid::from_rows(&["11.22", "11.22"]);
        let mut seq = sequencer();
        let Some(SequencerEvent::ChainStarted { chain, pass }) = seq.begin(&grid) else {
            panic!("expected a match");
        };
        assert_eq!(chain, 1);
        assert_eq!(pass.score_delta, 80);
        let (events, _) = run_to_idle(&mut seq, &mut grid);
        assert_eq!(
            events.last(),
            Some(&SequencerEvent::ChainFinished { length: 1 })
        );
    }

    #[test]
    fn test_begin_ignored_while_busy() {
        let grid = Grid::from_rows(&["0000"]);
        let mut seq = sequencer();
        assert!(seq.begin(&grid).is_some());
        assert_eq!(seq.begin(&grid), None);
        assert_eq!(seq.chain(), 1);
    }

    #[test]
    fn test_idle_step_is_noop() {
        let mut grid = Grid::from_rows(&["0000"]);
        let mut seq = sequencer();
        assert_eq!(seq.step(Duration::from_secs(10), &mut grid), None);
        assert_eq!(grid.occupied_count(), 4);
    }
}
