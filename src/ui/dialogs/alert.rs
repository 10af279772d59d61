use std::collections::VecDeque;

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;
use crate::validation::AlertQueue;

/// Modal message box. Shows one alert at a time; dismissing it reveals the
/// next pending one.
#[derive(Debug, Default)]
pub struct AlertDialog {
    current: Option<String>,
    pending: VecDeque<String>,
}

impl AlertDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Move everything queued by validation into the dialog
    pub fn take_from(&mut self, queue: &AlertQueue) {
        while let Some(message) = queue.pop() {
            self.pending.push_back(message);
        }
        if self.current.is_none() {
            self.current = self.pending.pop_front();
        }
    }

    pub fn dismiss(&mut self) {
        self.current = self.pending.pop_front();
    }

    pub fn render(&self, frame: &mut Frame) {
        let Some(message) = &self.current else {
            return;
        };

        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "[ OK ]",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        let dialog = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(dialog, area);
    }
}
