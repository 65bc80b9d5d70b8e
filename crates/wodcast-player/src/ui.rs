//! Player screen rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wodcast_core::{ConnectionState, Phase, RenderState};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // connection header
            Constraint::Min(5),    // workout panel
            Constraint::Length(1), // key help
        ])
        .split(frame.area());

    let state = app.render_state();
    draw_header(frame, app.connection(), &state, chunks[0]);
    draw_workout(frame, &state, chunks[1]);
    draw_help(frame, chunks[2]);
}

fn draw_header(frame: &mut Frame, connection: ConnectionState, state: &RenderState, area: Rect) {
    let (indicator, color) = match connection {
        ConnectionState::Connected => ("● Connected", Color::Green),
        ConnectionState::Connecting => ("○ Connecting...", Color::Yellow),
        ConnectionState::Disconnected => ("○ Disconnected", Color::Red),
    };

    let mut spans = vec![Span::styled(indicator, Style::default().fg(color))];
    if let Some(code) = &state.pairing_code {
        spans.push(Span::raw("    "));
        spans.push(Span::styled(
            format!("Pairing code: {code}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_workout(frame: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" wodcast ");

    let title = match &state.workout {
        Some(workout) => workout.name.clone(),
        None => "No workout selected".to_string(),
    };

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];

    let phase = phase_label(state.phase);
    if !phase.is_empty() {
        lines.push(Line::from(Span::styled(
            phase,
            Style::default().fg(Color::Cyan),
        )));
    }

    if let Some(message) = &state.message {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new("←/→: prev/next   Space: play/pause   q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Empty | Phase::AwaitingMedia => "",
        Phase::Buffering => "Buffering...",
        Phase::Playing => "Playing",
        Phase::Paused => "Paused",
        Phase::Ended => "Up next...",
    }
}
