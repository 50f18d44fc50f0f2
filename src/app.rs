//! App: terminal init, frame loop, key handling.

use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, VanishFx, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, warn};
use puyotui::{Difficulty, Direction, EngineConfig, Session};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Target frame time (~60 FPS). The engine is ticked once per frame with
/// the real elapsed time.
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub selected: Difficulty,
    pub opened_at: Instant,
}

impl MenuState {
    fn open(selected: Difficulty) -> Self {
        Self {
            selected,
            opened_at: Instant::now(),
        }
    }
}

pub struct App {
    theme: Theme,
    no_animation: bool,
    session: Session,
    screen: Screen,
    menu: MenuState,
    /// Last rejected request (e.g. a difficulty the palette cannot show).
    status: Option<String>,
    vanish_fx: VanishFx,
    last_frame: Instant,
}

impl App {
    pub fn new(
        config: EngineConfig,
        seed: Option<u64>,
        theme: Theme,
        no_menu: bool,
        no_animation: bool,
    ) -> Result<Self> {
        let difficulty = config.difficulty;
        let session = match seed {
            Some(seed) => Session::with_seed(config, seed)?,
            None => Session::new(config)?,
        };
        let screen = if no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Ok(Self {
            theme,
            no_animation,
            session,
            screen,
            menu: MenuState::open(difficulty),
            status: None,
            vanish_fx: VanishFx::default(),
            last_frame: Instant::now(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            cursor::Show,
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let result = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| self.run_loop(&mut terminal));

        // Restore even if the loop failed.
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, Show);
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let dt = now.saturating_duration_since(self.last_frame);
            self.last_frame = now;
            if self.screen == Screen::Playing {
                self.session.tick(dt);
            }

            terminal.draw(|f| {
                let view = View {
                    screen: self.screen,
                    session: &self.session,
                    theme: &self.theme,
                    menu: &self.menu,
                    status: self.status.as_deref(),
                    now,
                    no_animation: self.no_animation,
                };
                ui::draw(f, &view, &mut self.vanish_fx);
            })?;

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Presses and OS repeats; releases only show up on
                        // enhanced keyboards and carry no intent.
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        let action = key_to_action(key);
                        let keep_running = match self.screen {
                            Screen::Menu => self.handle_menu(action),
                            Screen::Playing => self.handle_playing(action),
                        };
                        if !keep_running {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Returns `false` to quit.
    fn handle_menu(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Rotate => self.menu.selected = self.menu.selected.prev(),
            Action::SoftDrop => self.menu.selected = self.menu.selected.next(),
            Action::Confirm => self.start_game(self.menu.selected),
            Action::Difficulty(difficulty) => {
                self.menu.selected = difficulty;
                self.start_game(difficulty);
            }
            _ => {}
        }
        true
    }

    /// Returns `false` to quit.
    fn handle_playing(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause => self.session.handle_pause_toggle(),
            Action::Restart => {
                if !self.session.is_paused() {
                    self.status = None;
                }
                self.session.handle_restart();
            }
            Action::Menu if self.session.is_game_over() => {
                self.menu = MenuState::open(self.session.difficulty());
                self.screen = Screen::Menu;
            }
            Action::Difficulty(difficulty) => {
                self.change_difficulty(difficulty);
            }
            Action::MoveLeft => {
                self.session.handle_move(Direction::Left);
            }
            Action::MoveRight => {
                self.session.handle_move(Direction::Right);
            }
            Action::SoftDrop => {
                self.session.handle_move(Direction::Down);
            }
            Action::Rotate => {
                self.session.handle_rotate();
            }
            Action::Menu | Action::Confirm | Action::None => {}
        }
        true
    }

    fn start_game(&mut self, difficulty: Difficulty) {
        if self.change_difficulty(difficulty) {
            info!("starting a {difficulty} game");
            self.screen = Screen::Playing;
        }
    }

    /// Apply a difficulty change, keeping any rejection for display.
    /// Returns whether a new game started.
    fn change_difficulty(&mut self, difficulty: Difficulty) -> bool {
        match self.session.handle_difficulty_change(difficulty) {
            Ok(started) => {
                if started {
                    self.status = None;
                }
                started
            }
            Err(err) => {
                warn!("difficulty change to {difficulty} rejected: {err}");
                self.status = Some(err.to_string());
                false
            }
        }
    }
}
