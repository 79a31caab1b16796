// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
}

pub fn get_help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "divibly - Help",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        section("Channels:"),
        Line::from("  1-9       - Channel 1 to 9"),
        Line::from("  0         - Channel 10"),
        Line::from("  ↑/→       - Next channel"),
        Line::from("  ↓/←       - Previous channel"),
        Line::from("  /         - Search channels"),
        Line::from("  r         - Reload channel file and retune"),
        Line::from(""),
        section("Video:"),
        Line::from("  f         - Toggle fullscreen"),
        Line::from("  m         - Toggle mute"),
        Line::from("  s         - Toggle subtitles"),
        Line::from("  z         - Resize window to video size"),
        Line::from(""),
        section("Search:"),
        Line::from("  Tab       - Complete channel name"),
        Line::from("  ↑/↓       - Choose match"),
        Line::from("  Enter     - Tune selected match"),
        Line::from("  Esc       - Cancel"),
        Line::from(""),
        section("General:"),
        Line::from("  ?/F1      - Toggle this help"),
        Line::from("  Esc/q     - Leave fullscreen, or quit"),
        Line::from("  Ctrl+C    - Quit"),
        Line::from(""),
        Line::from("Keys work in both this terminal and the video window"),
    ]
}

pub fn create_help_widget() -> Paragraph<'static> {
    Paragraph::new(get_help_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Help "),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
}
