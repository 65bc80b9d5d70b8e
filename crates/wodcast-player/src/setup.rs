//! First-run server setup screen
//!
//! Asks for the workout server address, verifies it with one state fetch,
//! and persists the result so later launches go straight to the player.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use wodcast_core::{ApiClient, Config, Gateway};

/// Normalize user input into a server base URL
pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    if with_scheme.ends_with('/') {
        with_scheme
    } else {
        format!("{with_scheme}/")
    }
}

struct SetupScreen {
    input: String,
    status: Option<String>,
    error: Option<String>,
}

/// Run the setup screen until a server is saved or the user quits
///
/// Returns the normalized server URL, or `None` if the user backed out.
pub async fn run(
    terminal: &mut Terminal<impl Backend>,
    config: &mut Config,
) -> Result<Option<String>> {
    let mut screen = SetupScreen {
        // Pre-fill a previously saved address
        input: config.server_url.clone().unwrap_or_default(),
        status: None,
        error: None,
    };

    loop {
        terminal.draw(|frame| screen.draw(frame))?;

        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Enter => {
                if screen.input.trim().is_empty() {
                    screen.error = Some("Enter the server address".to_string());
                    continue;
                }

                let url = normalize_server_url(&screen.input);
                screen.status = Some(format!("Connecting to {url}..."));
                screen.error = None;
                terminal.draw(|frame| screen.draw(frame))?;

                match ApiClient::new(&url).state().await {
                    Ok(_) => {
                        config.server_url = Some(url.clone());
                        config.setup_complete = true;
                        config.save()?;
                        return Ok(Some(url));
                    }
                    Err(e) => {
                        screen.status = None;
                        screen.error = Some(format!("Connection failed: {e}"));
                    }
                }
            }
            KeyCode::Backspace => {
                screen.input.pop();
            }
            KeyCode::Char(c) => screen.input.push(c),
            _ => {}
        }
    }
}

impl SetupScreen {
    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(7),
                Constraint::Min(1),
            ])
            .split(frame.area());

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Connect to your workout server ");

        let mut lines = vec![
            Line::raw(""),
            Line::styled(
                format!("Server address: {}_", self.input),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
        ];

        if let Some(status) = &self.status {
            lines.push(Line::styled(
                status.clone(),
                Style::default().fg(Color::Cyan),
            ));
        } else if let Some(error) = &self.error {
            lines.push(Line::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ));
        } else {
            lines.push(Line::styled(
                "Enter: connect   Esc: quit",
                Style::default().fg(Color::DarkGray),
            ));
        }

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme_and_slash() {
        assert_eq!(
            normalize_server_url("192.168.1.20:8080"),
            "http://192.168.1.20:8080/"
        );
        assert_eq!(
            normalize_server_url("  gym-pi:8080  "),
            "http://gym-pi:8080/"
        );
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(
            normalize_server_url("https://gym.example.com"),
            "https://gym.example.com/"
        );
        assert_eq!(
            normalize_server_url("http://gym-pi:8080/"),
            "http://gym-pi:8080/"
        );
    }
}
