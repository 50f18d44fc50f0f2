//! puyotui: falling-pair colour matching puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use puyotui::{Difficulty, EngineConfig};
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        puyotui::logging::init(path, args.log_level)
            .with_context(|| format!("cannot log to {}", path.display()))?;
    }
    let theme = theme::Theme::for_palette(args.palette)?;
    let config = EngineConfig {
        difficulty: args.difficulty,
        available_token_kinds: theme.token_kinds(),
        fall_interval: Duration::from_millis(args.fall_interval_ms),
        ..EngineConfig::default()
    };
    log::info!(
        "starting: {} ({} kinds), fall every {:?}, seed {:?}",
        config.difficulty,
        config.token_kinds(),
        config.fall_interval,
        args.seed
    );
    let mut app = App::new(config, args.seed, theme, args.no_menu, args.no_animation)?;
    app.run()
}

/// Falling-pair colour matching puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "puyotui",
    version,
    about = "Falling-pair colour matching puzzle in the terminal. Join four of a kind to clear them and set off chains.",
    long_about = "puyotui drops pairs of coloured tokens into a 6x12 well.\n\n\
        Four or more tokens of the same kind touching edge to edge vanish. Whatever \
        was resting on them falls, and if that forms a new group it vanishes too: a chain. \
        Every vanished token is worth 10 points.\n\n\
        CONTROLS:\n  Left/Right, h/l  Move     Up, k, Space  Rotate    Down, j  Soft drop\n  \
        P  Pause    R  Restart    1/2/3  Difficulty    M  Menu (after game over)    Q / Esc  Quit"
)]
pub struct Args {
    /// Difficulty: beginner (4 kinds), intermediate (6) or advanced (20).
    #[arg(short, long, default_value = "beginner")]
    pub difficulty: Difficulty,

    /// Seed for the piece sequence; random when not set.
    #[arg(short, long, value_name = "N")]
    pub seed: Option<u64>,

    /// Skip the difficulty menu and start immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable the vanish fade (tokens still take the same time to vanish).
    #[arg(long)]
    pub no_animation: bool,

    /// Time between automatic one-row drops.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub fall_interval_ms: u64,

    /// Colour palette: normal or high-contrast.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write logs to this file. The terminal is taken by the game, so
    /// nothing is logged without it.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level used with --log-file: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["puyotui"]).unwrap();
        assert_eq!(args.difficulty, Difficulty::Beginner);
        assert_eq!(args.fall_interval_ms, 500);
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::try_parse_from([
            "puyotui",
            "--difficulty",
            "advanced",
            "--seed",
            "42",
            "--palette",
            "high-contrast",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.difficulty, Difficulty::Advanced);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.palette, Palette::HighContrast);
        assert_eq!(args.log_level, LevelFilter::Debug);
    }
}
