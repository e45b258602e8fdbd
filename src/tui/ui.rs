//! Stateless rendering of the game screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::app::{App, StatusTone};
use crate::game::{Cell, Mark};
use crate::ranking::{RankingEntry, RankingState, RankingView};

/// Renders the whole screen.
pub fn draw(frame: &mut Frame, app: &App, ranking: &RankingState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(16),   // Body
            Constraint::Length(3), // Help
        ])
        .split(frame.area());

    draw_title(frame, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_game(frame, body[0], app);
    draw_ranking(frame, body[1], ranking);
    draw_help(frame, chunks[2]);
}

/// Renders the placeholder shown until the startup credential check is done.
pub fn draw_loading(frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(frame.area());

    draw_title(frame, chunks[0]);
    let loading = Paragraph::new("Loading...")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(loading, chunks[1]);
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("Strictly OX - Tic Tac Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn draw_game(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Score
            Constraint::Length(2),  // Status
            Constraint::Length(11), // Board
            Constraint::Min(3),     // Reset / login
        ])
        .split(area);

    let session = app.session();

    let score = Paragraph::new(Line::from(vec![
        Span::raw("Score: "),
        Span::styled(
            session.score().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   Win streak: "),
        Span::styled(
            session.streak().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(score, chunks[0]);

    let (text, tone) = app.status();
    let mut status_lines = vec![Line::from(Span::styled(text, tone_style(tone)))];
    if let Some(notice) = app.notice() {
        status_lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Red),
        )));
    }
    let status = Paragraph::new(status_lines).alignment(Alignment::Center);
    frame.render_widget(status, chunks[1]);

    draw_board(frame, chunks[2], app);
    draw_controls(frame, chunks[3], app);
}

fn tone_style(tone: StatusTone) -> Style {
    let color = match tone {
        StatusTone::Locked => Color::DarkGray,
        StatusTone::Idle => Color::White,
        StatusTone::Playing => Color::Yellow,
        StatusTone::Won => Color::Green,
        StatusTone::Lost => Color::Red,
        StatusTone::Drawn => Color::Blue,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) {
    let board_area = center_rect(area, 23, 11);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    for (row, chunk) in [rows[0], rows[2], rows[4]].into_iter().enumerate() {
        draw_row(frame, chunk, app, row * 3);
    }
    draw_separator(frame, rows[1]);
    draw_separator(frame, rows[3]);
}

fn draw_row(frame: &mut Frame, area: Rect, app: &App, first: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Length(7),
        ])
        .split(area);

    draw_cell(frame, cols[0], app, first);
    draw_separator_vertical(frame, cols[1]);
    draw_cell(frame, cols[2], app, first + 1);
    draw_separator_vertical(frame, cols[3]);
    draw_cell(frame, cols[4], app, first + 2);
}

fn draw_cell(frame: &mut Frame, area: Rect, app: &App, index: usize) {
    let session = app.session();
    let cell = session.board().get(index).unwrap_or_default();

    let (symbol, base_style) = match cell {
        Cell::Empty if session.is_cell_playable(index) => (
            format!("{}", index + 1),
            Style::default().fg(Color::Gray),
        ),
        Cell::Empty => (" ".to_string(), Style::default().fg(Color::DarkGray)),
        Cell::Occupied(Mark::X) => (
            "X".to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Cell::Occupied(Mark::O) => (
            "O".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    let style = if index == app.cursor() && session.has_credential() {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}  ", symbol), style)),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_controls(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::from(Span::styled(
        app.reset_label(),
        if app.session().can_reset() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        },
    ))];

    if app.session().has_credential() {
        lines.push(Line::from("l: Log out"));
    } else {
        lines.push(Line::from(""));
        for (provider, url) in app.login_links() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}: ", provider.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(url.clone(), Style::default().fg(Color::Cyan)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "Then restart with --landing-url <url you were sent to>",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let controls = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(controls, area);
}

fn draw_ranking(frame: &mut Frame, area: Rect, ranking: &RankingState) {
    let title = if *ranking.refreshing() {
        " Leaderboard (refreshing) "
    } else {
        " Leaderboard "
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let lines: Vec<Line> = match ranking.view() {
        RankingView::Loading => vec![Line::from(Span::styled(
            "Loading leaderboard...",
            Style::default().fg(Color::DarkGray),
        ))],
        RankingView::Failed(message) => vec![Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        ))],
        RankingView::Ready(entries) if entries.is_empty() => vec![Line::from(Span::styled(
            "No players yet",
            Style::default().fg(Color::DarkGray),
        ))],
        RankingView::Ready(entries) => entries
            .iter()
            .enumerate()
            .flat_map(|(i, entry)| ranking_lines(i + 1, entry))
            .collect(),
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn ranking_lines(rank: usize, entry: &RankingEntry) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{} ", RankingEntry::medal(rank))),
        Span::styled(
            entry.display_name().as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {} pts", entry.total_score())),
    ])];

    if *entry.streak() > 0 {
        lines.push(Line::from(Span::styled(
            format!("   🔥 {} wins in a row", entry.streak()),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "Arrows/1-9: choose  Enter: play  n: new game  r: refresh  l: log out  q: quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, area);
}

fn draw_separator(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("───────┼───────┼───────").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn draw_separator_vertical(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new(vec![Line::from("│"), Line::from("│"), Line::from("│")])
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}
