//! Terminal rendering of a session snapshot.
//!
//! The playfield is sampled onto the character grid: every terminal cell
//! looks at the world point under its centre. The bird is stamped last so it
//! is never hidden by a pipe.

use crate::core::{BirdView, SessionState, Snapshot};
use crate::ui::game_common::{
    create_game_layout, render_banner, render_info_panel_frame, render_status_bar,
    render_too_small, BannerKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 16;
const INFO_PANEL_WIDTH: u16 = 22;
/// Width of one ground stripe in playfield units.
const GROUND_STRIPE: f64 = 12.0;

const CONTROLS: &[(&str, &str)] = &[
    ("[Space]", "Flap"),
    ("[P]", "Pause"),
    ("[R]", "Restart"),
    ("[Q]", "Quit"),
];

/// What one terminal cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Sky,
    Pipe,
    Ground { light: bool },
    Bird(char),
}

/// Sample the snapshot onto a `cols` x `rows` grid, row-major.
pub fn rasterize(snapshot: &Snapshot, cols: usize, rows: usize) -> Vec<Vec<Cell>> {
    if cols == 0
        || rows == 0
        || snapshot.playfield_width <= 0.0
        || snapshot.playfield_height <= 0.0
    {
        return Vec::new();
    }

    let cell_w = snapshot.playfield_width / cols as f64;
    let cell_h = snapshot.playfield_height / rows as f64;

    let mut grid: Vec<Vec<Cell>> = (0..rows)
        .map(|row| {
            let wy = (row as f64 + 0.5) * cell_h;
            (0..cols)
                .map(|col| {
                    let wx = (col as f64 + 0.5) * cell_w;
                    if wy >= snapshot.ground_y {
                        let stripe =
                            ((wx + snapshot.ground_offset) / GROUND_STRIPE).floor() as i64;
                        Cell::Ground {
                            light: stripe.rem_euclid(2) == 0,
                        }
                    } else if snapshot
                        .pipes
                        .iter()
                        .any(|p| p.top.contains(wx, wy) || p.bottom.contains(wx, wy))
                    {
                        Cell::Pipe
                    } else {
                        Cell::Sky
                    }
                })
                .collect()
        })
        .collect();

    let bird = &snapshot.bird;
    let cx = bird.bounds.x + bird.bounds.width / 2.0;
    let cy = bird.bounds.y + bird.bounds.height / 2.0;
    let col = ((cx / cell_w).floor().max(0.0) as usize).min(cols - 1);
    let row = ((cy / cell_h).floor().max(0.0) as usize).min(rows - 1);
    grid[row][col] = Cell::Bird(bird_glyph(bird));

    grid
}

fn bird_glyph(bird: &BirdView) -> char {
    if !bird.alive {
        'x'
    } else if bird.rotation < -20.0 {
        '▲'
    } else if bird.rotation > 45.0 {
        '▼'
    } else {
        '►'
    }
}

fn cell_span(cell: Cell) -> Span<'static> {
    match cell {
        Cell::Sky => Span::raw(" "),
        Cell::Pipe => Span::styled("█", Style::default().fg(Color::Green)),
        Cell::Ground { light: true } => Span::styled("▓", Style::default().fg(Color::Yellow)),
        Cell::Ground { light: false } => Span::styled("▒", Style::default().fg(Color::Yellow)),
        Cell::Bird(c) => Span::styled(
            c.to_string(),
            Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

/// Draw the whole game screen. `new_best` marks the ended episode as a record.
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot, new_best: bool) {
    let area = frame.size();
    if area.width < MIN_COLS || area.height < MIN_ROWS {
        render_too_small(frame, area, MIN_COLS, MIN_ROWS);
        return;
    }

    let layout = create_game_layout(
        frame,
        area,
        " Flappy Bird ",
        Color::Cyan,
        INFO_PANEL_WIDTH,
    );

    render_play_area(frame, layout.content, snapshot);
    render_status_bar_content(frame, layout.status_bar, snapshot);
    render_info_panel(frame, layout.info_panel, snapshot);
    render_overlay(frame, layout.content, snapshot, new_best);
}

fn render_play_area(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let grid = rasterize(snapshot, area.width as usize, area.height as usize);
    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| Line::from(row.into_iter().map(cell_span).collect::<Vec<_>>()))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let (text, color) = match snapshot.state {
        SessionState::Idle => ("Press Space to start!".to_string(), Color::Yellow),
        SessionState::Running => (format!("Score: {}", snapshot.score), Color::Green),
        SessionState::Paused => ("Paused".to_string(), Color::Cyan),
        SessionState::Ended => (format!("Crashed with {}", snapshot.score), Color::Red),
    };
    render_status_bar(frame, area, &text, color, CONTROLS);
}

fn render_info_panel(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let inner = render_info_panel_frame(frame, area);

    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let state = match snapshot.state {
        SessionState::Idle => ("Ready", Color::Yellow),
        SessionState::Running => ("Flying", Color::Green),
        SessionState::Paused => ("Paused", Color::Cyan),
        SessionState::Ended => ("Crashed", Color::Red),
    };

    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", state.0),
            Style::default().fg(state.1).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Score: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", snapshot.score),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Best:  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", snapshot.best_score),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Climb: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:+.1}", -snapshot.bird.velocity),
                Style::default().fg(Color::Green),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_overlay(frame: &mut Frame, area: Rect, snapshot: &Snapshot, new_best: bool) {
    match snapshot.state {
        SessionState::Running => {}
        SessionState::Idle => render_banner(
            frame,
            area,
            BannerKind::Ready,
            "GET READY",
            &format!("Best: {}", snapshot.best_score),
            "[Space] to flap",
        ),
        SessionState::Paused => render_banner(
            frame,
            area,
            BannerKind::Paused,
            "PAUSED",
            &format!("Score: {}", snapshot.score),
            "[P] resume  [R] restart",
        ),
        SessionState::Ended if new_best => render_banner(
            frame,
            area,
            BannerKind::NewBest,
            "NEW BEST!",
            &format!("You passed {} pipes", snapshot.score),
            "[Space] play again  [Q] quit",
        ),
        SessionState::Ended => render_banner(
            frame,
            area,
            BannerKind::Crash,
            "CRASH!",
            &format!("Score {}, best {}", snapshot.score, snapshot.best_score),
            "[Space] play again  [Q] quit",
        ),
    }
}
