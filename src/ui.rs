//! Layout and drawing: playfield, next preview, score, pause and game over.

use crate::board::Cell;
use crate::game::{SessionState, Snapshot};
use crate::piece::Piece;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each board cell is two terminal columns wide so cells look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;

/// Duration of the game-over fade (TachyonFX) in ms.
const GAME_OVER_FADE_MS: u32 = 600;

/// Next preview area in board cells (widest / tallest spawn orientation).
const NEXT_PREVIEW_COLS: u16 = 4;
const NEXT_PREVIEW_ROWS: u16 = 2;

/// Game-over fade effect and the last time it was processed.
#[derive(Default)]
pub struct GameOverFade {
    effect: Option<Effect>,
    processed_at: Option<Instant>,
}

impl GameOverFade {
    fn is_done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Board size in terminal cells including the border.
fn board_outer_size(snapshot: &Snapshot<'_>) -> (u16, u16) {
    let board = snapshot.board;
    (
        board.width() as u16 * CELL_WIDTH + 2,
        board.height() as u16 + 2,
    )
}

/// Draw the session. `fade` is `None` when animations are disabled.
pub fn draw(
    frame: &mut Frame,
    snapshot: Snapshot<'_>,
    theme: &Theme,
    paused: bool,
    fade: Option<&mut GameOverFade>,
    now: Instant,
) {
    let area = frame.area();
    let (board_area, sidebar_area) = split_game_area(area, &snapshot);

    let over = snapshot.state == SessionState::GameOver;
    let fading = over && fade.as_ref().is_some_and(|f| !f.is_done());
    draw_board(frame.buffer_mut(), &snapshot, theme, board_area, over && !fading);
    draw_sidebar(frame.buffer_mut(), &snapshot, theme, sidebar_area);

    if over {
        if let Some(fade) = fade.filter(|_| fading) {
            apply_game_over_fade(frame, theme, board_area, fade, now);
        }
        draw_game_over(frame.buffer_mut(), &snapshot, theme, board_area);
    } else if paused {
        draw_pause_overlay(frame.buffer_mut(), theme, board_area);
    }
}

/// Centre board + sidebar in `area`; returns (board, sidebar) rects.
fn split_game_area(area: Rect, snapshot: &Snapshot<'_>) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(snapshot);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bw + SIDEBAR_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

fn put_cell(buf: &mut Buffer, clip: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    for dx in 0..CELL_WIDTH {
        let rx = x + dx;
        if rx < clip.right() && y < clip.bottom() {
            buf[(rx, y)].set_symbol(symbol).set_style(style);
        }
    }
}

/// Locked cells, grid dots and the falling piece. `dimmed` greys out locked
/// cells and hides the piece (final state of the game-over fade).
fn draw_board(buf: &mut Buffer, snapshot: &Snapshot<'_>, theme: &Theme, area: Rect, dimmed: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" blocktui ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, buf);

    let empty_style = Style::default().fg(theme.div_line).bg(theme.bg);
    for (y, row) in snapshot.board.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            let ry = inner.y + y as u16;
            match cell {
                Cell::Empty => put_cell(buf, inner, rx, ry, "·", empty_style),
                Cell::Filled(id) => {
                    let color = if dimmed {
                        theme.inactive_fg
                    } else {
                        theme.piece_color(*id)
                    };
                    put_cell(buf, inner, rx, ry, "█", Style::default().fg(color).bg(theme.bg));
                }
            }
        }
    }

    if snapshot.state == SessionState::Falling {
        draw_piece_cells(buf, inner, snapshot.current, theme);
    }
}

fn draw_piece_cells(buf: &mut Buffer, inner: Rect, piece: &Piece, theme: &Theme) {
    let style = Style::default().fg(theme.piece_color(piece.color)).bg(theme.bg);
    for (px, py) in piece.cells() {
        if px < 0 || py < 0 {
            continue;
        }
        let rx = inner.x + px as u16 * CELL_WIDTH;
        let ry = inner.y + py as u16;
        put_cell(buf, inner, rx, ry, "█", style);
    }
}

fn draw_sidebar(buf: &mut Buffer, snapshot: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let help_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(NEXT_PREVIEW_ROWS + 3), // Next (border + title + preview)
            Constraint::Length(4),                     // Score, pieces
            Constraint::Min(0),                        // Controls
        ])
        .split(area);

    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Next ", title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], buf);
    draw_next_preview(buf, snapshot.next, theme, next_inner);

    let stats = Text::from(vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(snapshot.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Pieces: ", title_style),
            Span::styled(snapshot.pieces_locked.to_string(), fg_style),
        ]),
    ]);
    Paragraph::new(stats)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[1], buf);

    let help = Text::from(vec![
        Line::styled("←/→ h/l  move", help_style),
        Line::styled("↑ k      rotate", help_style),
        Line::styled("↓ j      soft drop", help_style),
        Line::styled("space    hard drop", help_style),
        Line::styled("p pause  q quit", help_style),
    ]);
    Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[2], buf);
}

/// Next piece in its spawn orientation, centred in the preview box.
fn draw_next_preview(buf: &mut Buffer, next: &Piece, theme: &Theme, area: Rect) {
    let preview = Rect {
        width: area.width.min(NEXT_PREVIEW_COLS * CELL_WIDTH),
        height: area.height.min(NEXT_PREVIEW_ROWS),
        ..area
    };
    let w = next.shape.width() as u16 * CELL_WIDTH;
    let h = next.shape.height() as u16;
    let off_x = preview.width.saturating_sub(w) / 2;
    let off_y = preview.height.saturating_sub(h) / 2;
    let style = Style::default().fg(theme.piece_color(next.color)).bg(theme.bg);
    for (j, i) in next.shape.offsets() {
        let rx = preview.x + off_x + j as u16 * CELL_WIDTH;
        let ry = preview.y + off_y + i as u16;
        put_cell(buf, preview, rx, ry, "█", style);
    }
}

/// Fade locked cells to the inactive colour once the game ends.
fn apply_game_over_fade(
    frame: &mut Frame,
    theme: &Theme,
    board_area: Rect,
    fade: &mut GameOverFade,
    now: Instant,
) {
    let delta = fade
        .processed_at
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    fade.processed_at = Some(now);

    let effect = fade.effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board_area)
    });
    frame.render_effect(effect, board_area, TfxDuration::from_millis(delta_ms));
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 20, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(Span::styled(
            " P resume  Q quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, buf);
}

fn draw_game_over(buf: &mut Buffer, snapshot: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 20, 8);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", snapshot.score),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R restart  Q quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::game::{GameSession, Input};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn session() -> GameSession {
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        GameSession::new(&config, 0)
    }

    #[test]
    fn test_draw_shows_board_and_sidebar() {
        let mut terminal = Terminal::new(TestBackend::new(60, 26)).unwrap();
        let s = session();
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, s.snapshot(), &theme, false, None, Instant::now()))
            .unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("blocktui"));
        assert!(text.contains("Next"));
        assert!(text.contains("Score:"));
        assert!(!text.contains("Paused"));
    }

    #[test]
    fn test_draw_pause_and_game_over_overlays() {
        let mut terminal = Terminal::new(TestBackend::new(60, 26)).unwrap();
        let theme = Theme::default();
        let mut s = session();
        terminal
            .draw(|f| draw(f, s.snapshot(), &theme, true, None, Instant::now()))
            .unwrap();
        assert!(screen_text(&terminal).contains("Paused"));

        let mut now = 0;
        while !s.is_game_over() {
            now += 1_000;
            s.frame([Input::HardDrop], now);
        }
        let mut fade = GameOverFade::default();
        terminal
            .draw(|f| draw(f, s.snapshot(), &theme, false, Some(&mut fade), Instant::now()))
            .unwrap();
        assert!(screen_text(&terminal).contains("Game Over"));
        assert!(fade.effect.is_some());
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(12, 6)).unwrap();
        let s = session();
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, s.snapshot(), &theme, false, None, Instant::now()))
            .unwrap();
    }
}
