// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use super::app::App;
use super::widgets::{centered_rect, create_help_widget};
use crate::search::ChannelSearch;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);

    if let Some(overlay) = &app.overlay {
        draw_status_overlay(frame, size, &overlay.text);
    }

    if let Some(search) = &app.search {
        draw_search_popup(frame, app, search, size);
    }

    if app.show_help {
        draw_help_overlay(frame, size);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(app.title.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );

    frame.render_widget(header, area);
}

fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Channel list
            Constraint::Length(40), // Logs
        ])
        .split(area);

    draw_channel_list(frame, app, chunks[0]);
    draw_logs_panel(frame, app, chunks[1]);
}

fn draw_channel_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Channels ");

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.channels.is_empty() {
        let empty_msg = Paragraph::new("No channels loaded")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    app.update_visible_height(inner_area.height as usize);

    let items: Vec<ListItem> = app
        .channels
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(inner_area.height as usize)
        .map(|(index, channel)| {
            let label = format!(
                "{:>3}  {:<24} {:>7.1} MHz  prog {}",
                index + 1,
                channel.name,
                channel.frequency as f64 / 1_000_000.0,
                channel.program
            );
            if index == app.cursor {
                ListItem::new(Line::from(vec![Span::raw(" ▶ "), Span::raw(label)]).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                ListItem::new(Line::from(vec![Span::raw("   "), Span::raw(label)]))
            }
        })
        .collect();

    let list = List::new(items).style(Style::default().fg(Color::White));
    frame.render_widget(list, inner_area);
}

fn draw_logs_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Logs ");

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    // Show most recent logs that fit in the area
    let visible_count = inner_area.height as usize;
    let start = app.logs.len().saturating_sub(visible_count);

    let log_lines: Vec<Line> = app.logs[start..]
        .iter()
        .map(|(time, msg)| {
            Line::from(vec![
                Span::styled(
                    time.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(msg.clone(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let logs = Paragraph::new(log_lines).wrap(Wrap { trim: true });
    frame.render_widget(logs, inner_area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let flag = |on: bool, label: &'static str| {
        if on {
            Span::styled(
                format!("[{}] ", label),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!("[{}] ", label), Style::default().fg(Color::DarkGray))
        }
    };

    let footer = Paragraph::new(Line::from(vec![
        flag(app.fullscreen, "FULL"),
        flag(app.muted, "MUTE"),
        flag(app.subtitle_track.is_some(), "SUBS"),
        Span::styled(
            " ↑↓ channel  0-9 select  / search  f full  m mute  s subs  z size  r reload  ? help  q quit",
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(footer, area);
}

fn draw_status_overlay(frame: &mut Frame, area: Rect, text: &str) {
    let width = (text.chars().count() as u16 + 8).min(area.width);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height / 4,
        width,
        height: 3.min(area.height),
    };

    let overlay = Paragraph::new(text)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(Clear, popup);
    frame.render_widget(overlay, popup);
}

fn draw_search_popup(frame: &mut Frame, app: &App, search: &ChannelSearch, area: Rect) {
    let popup = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Search channels (Tab complete, Enter tune, Esc cancel) ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("/ ", Style::default().fg(Color::Yellow)),
        Span::raw(search.query.as_str()),
        Span::styled("█", Style::default().fg(Color::Gray)),
    ]));
    frame.render_widget(input, chunks[0]);

    if search.candidates.is_empty() {
        let empty = Paragraph::new("No matching channels")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let max = app.config.ui.max_candidates.max(1).min(chunks[1].height as usize);
    // Slide the window so the selection stays in view
    let start = search.selected.saturating_sub(max.saturating_sub(1));

    let items: Vec<ListItem> = search
        .candidates
        .iter()
        .enumerate()
        .skip(start)
        .take(max)
        .filter_map(|(pos, &idx)| {
            let channel = app.channels.get(idx)?;
            let item = if pos == search.selected {
                ListItem::new(format!(" ▶ {}", channel.name)).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!("   {}", channel.name))
            };
            Some(item)
        })
        .collect();

    frame.render_widget(List::new(items), chunks[1]);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(create_help_widget(), popup);
}
