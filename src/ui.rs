//! Layout and drawing: menu, playfield, next preview, stats, pause and game over.

use crate::app::{MenuState, Screen};
use crate::theme::Theme;
use puyotui::{ChainPhase, Difficulty, Session, TokenKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Every grid cell is two terminal columns wide so it reads roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 24;
const MENU_SLIDE_MS: u32 = 500;

/// Everything the drawing code reads from the app for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub session: &'a Session,
    pub theme: &'a Theme,
    pub menu: &'a MenuState,
    pub status: Option<&'a str>,
    pub now: Instant,
    pub no_animation: bool,
}

/// Vanish fade state carried across frames.
#[derive(Default)]
pub struct VanishFx {
    effect: Option<Effect>,
    last_processed: Option<Instant>,
}

impl VanishFx {
    fn reset(&mut self) {
        self.effect = None;
        self.last_processed = None;
    }
}

/// Playfield size in terminal cells, border included.
fn playfield_size(session: &Session) -> (u16, u16) {
    let grid = session.grid();
    (
        grid.width() as u16 * CELL_WIDTH + 2,
        grid.height() as u16 + 2,
    )
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn draw(frame: &mut Frame, view: &View<'_>, vanish_fx: &mut VanishFx) {
    let area = frame.area();
    match view.screen {
        Screen::Menu => {
            vanish_fx.reset();
            draw_menu(frame, view, area);
        }
        Screen::Playing => {
            let board = draw_game(frame, view, area);
            match view.session.phase() {
                ChainPhase::Vanishing { cells, .. } if !view.no_animation => {
                    apply_vanish_effect(frame, view, board, cells, vanish_fx);
                }
                _ => vanish_fx.reset(),
            }
            if view.session.is_paused() {
                draw_pause_overlay(frame, view.theme, area);
            } else if view.session.is_game_over() {
                draw_game_over(frame, view, area);
            }
        }
    }
}

/// Buffer positions covered by the given grid cells.
fn vanishing_buffer_positions(board: Rect, cells: &[(usize, usize)]) -> HashSet<(u16, u16)> {
    cells
        .iter()
        .flat_map(|&(x, y)| {
            let bx = board.x + x as u16 * CELL_WIDTH;
            let by = board.y + y as u16;
            (0..CELL_WIDTH).map(move |dx| (bx + dx, by))
        })
        .collect()
}

/// Create the vanish fade on the first vanishing frame and advance it by
/// real elapsed time. Frozen while paused.
fn apply_vanish_effect(
    frame: &mut Frame,
    view: &View<'_>,
    board: Rect,
    cells: &[(usize, usize)],
    vanish_fx: &mut VanishFx,
) {
    let delta = if view.session.is_paused() {
        Duration::ZERO
    } else {
        vanish_fx
            .last_processed
            .map(|t| view.now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO)
    };
    vanish_fx.last_processed = Some(view.now);

    if vanish_fx.effect.is_none() {
        let positions = vanishing_buffer_positions(board, cells);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let fade_ms = view.session.config().vanish_duration.as_millis().min(u32::MAX as u128) as u32;
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (fade_ms, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        vanish_fx.effect = Some(effect);
    }

    if let Some(effect) = vanish_fx.effect.as_mut() {
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_menu(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 44, 17);

    let highlight_style = Style::default().fg(theme.bg).bg(theme.title).bold();
    let normal_style = Style::default().fg(theme.main_fg);
    let hint_style = Style::default().fg(theme.inactive_fg);
    let key_style = Style::default().fg(theme.title);

    let title = Line::from(vec![
        Span::styled(" puyo ", Style::default().fg(theme.tokens[0].color).bold()),
        Span::styled(" tui ", Style::default().fg(theme.main_fg).bold()),
    ]);

    let mut lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        Line::from(Span::styled(
            " ─ DIFFICULTY ─ ",
            Style::default().fg(theme.div_line),
        )),
        Line::from(""),
    ];
    for (slot, difficulty) in (1u8..).zip(Difficulty::ALL) {
        let style = if difficulty == view.menu.selected {
            highlight_style
        } else {
            normal_style
        };
        lines.push(Line::from(Span::styled(
            format!(
                " {slot}  {:<13}{:>2} kinds ",
                difficulty.label(),
                difficulty.token_kinds()
            ),
            style,
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", key_style),
            Span::styled("SELECT  ", hint_style),
            Span::styled(" ENTER ", key_style),
            Span::styled("START  ", hint_style),
            Span::styled(" 1-3 ", key_style),
            Span::styled("QUICK", hint_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(" [Q] QUIT ", Style::default().fg(Color::Rgb(255, 80, 80)))),
    ]);
    if let Some(status) = view.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Red),
        )));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Slide in from below, ease-out cubic.
    let elapsed = view
        .now
        .saturating_duration_since(view.menu.opened_at)
        .as_millis()
        .min(u128::from(MENU_SLIDE_MS)) as u32;
    let t = elapsed as f32 / MENU_SLIDE_MS as f32;
    let eased = 1.0 - (1.0 - t).powi(3);
    let mut anim_popup = popup;
    anim_popup.y += ((1.0 - eased) * 10.0) as u16;
    anim_popup.height = anim_popup
        .height
        .min((area.y + area.height).saturating_sub(anim_popup.y));

    p.render(anim_popup, frame.buffer_mut());
}

/// Draw board + sidebar centred in `area`; returns the board's inner rect.
fn draw_game(frame: &mut Frame, view: &View<'_>, area: Rect) -> Rect {
    let (pw, ph) = playfield_size(view.session);
    let total_w = pw + SIDEBAR_WIDTH;
    let total_h = ph.max(15);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let playfield_area = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };

    let board = draw_playfield(frame, view, playfield_area);
    draw_sidebar(frame, view, inner[1]);
    board
}

fn token_style(theme: &Theme, kind: TokenKind) -> (&'static str, Style) {
    let token = theme.token(kind);
    (
        token.glyph,
        Style::default().fg(theme.bg).bg(token.color).bold(),
    )
}

#[allow(clippy::similar_names)]
fn draw_playfield(frame: &mut Frame, view: &View<'_>, area: Rect) -> Rect {
    let theme = view.theme;
    let session = view.session;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" puyotui ", theme.title));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = session.grid();
    let buf = frame.buffer_mut();
    let empty = Style::default().bg(theme.bg);
    let in_board = |rx: u16, ry: u16| {
        rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height
    };

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let rx = board.x + x as u16 * CELL_WIDTH;
            let ry = board.y + y as u16;
            if !in_board(rx, ry) {
                continue;
            }
            match grid.get(x, y) {
                Some(kind) => {
                    let (glyph, style) = token_style(theme, kind);
                    buf.set_string(rx, ry, glyph, style);
                }
                None => {
                    buf.set_string(rx, ry, "  ", empty);
                }
            }
        }
    }

    // The promoted piece only appears once the chain has played out.
    if session.phase().is_idle() && !session.is_game_over() {
        for ((x, y), kind) in session.current_piece().placed() {
            if !grid.contains(x, y) {
                continue;
            }
            let rx = board.x + x as u16 * CELL_WIDTH;
            let ry = board.y + y as u16;
            if in_board(rx, ry) {
                let (glyph, style) = token_style(theme, kind);
                buf.set_string(rx, ry, glyph, style);
            }
        }
    }
    board
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let hint_style = Style::default().fg(theme.inactive_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Next (border + title + pair)
            Constraint::Length(6), // Stats
            Constraint::Length(4), // Status
            Constraint::Fill(1),
        ])
        .split(area);

    // --- Next ---
    let next_block = sidebar_block(theme);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_inner, frame.buffer_mut());
    let [pivot, satellite] = session.next_piece().tokens();
    let preview_x = next_inner.x + next_inner.width.saturating_sub(CELL_WIDTH) / 2;
    for (row, kind) in [pivot, satellite].into_iter().enumerate() {
        let ry = next_inner.y + 1 + row as u16;
        if ry < next_inner.y + next_inner.height {
            let (glyph, style) = token_style(theme, kind);
            frame.buffer_mut().set_string(preview_x, ry, glyph, style);
        }
    }

    // --- Stats ---
    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[1]);
    stats_block.render(chunks[1], frame.buffer_mut());
    let live = session.chain_count();
    let chain_line = if live > 0 {
        Line::from(Span::styled(
            format!(" {live} Chain! "),
            Style::default().fg(theme.bg).bg(theme.title).bold(),
        ))
    } else if session.last_chain() > 1 {
        Line::from(Span::styled(
            format!("{} Chain!", session.last_chain()),
            title_style.bold(),
        ))
    } else {
        Line::from("")
    };
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(session.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Level: ", title_style),
            Span::styled(session.difficulty().label(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Kinds: ", title_style),
            Span::styled(session.config().token_kinds().to_string(), fg_style),
        ]),
        chain_line,
    ];
    Paragraph::new(Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Status ---
    let status_block = sidebar_block(theme);
    let status_inner = status_block.inner(chunks[2]);
    status_block.render(chunks[2], frame.buffer_mut());
    let status_lines = match view.status {
        Some(message) => vec![Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red),
        ))],
        None => vec![
            Line::from(Span::styled("←→ move  ↑ rotate", hint_style)),
            Line::from(Span::styled("↓ drop  P pause  1-3", hint_style)),
        ],
    };
    Paragraph::new(Text::from(status_lines)).render(status_inner, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P resume    Q quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(sidebar_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let popup = centered(area, 30, 9);
    let fg_style = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", session.score()),
            fg_style,
        )),
        Line::from(Span::styled(
            format!(" Level: {} ", session.difficulty()),
            fg_style,
        )),
        Line::from(""),
        Line::from(Span::styled(" R restart  M menu  Q quit ", fg_style)),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(sidebar_block(theme).title(Span::styled(" puyotui ", theme.title)))
        .render(popup, frame.buffer_mut());
}
