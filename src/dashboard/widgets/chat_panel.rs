use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{ChatMessage, ChatRole};

pub struct ChatPanel {
    messages: Vec<ChatMessage>,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn set_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_failed(&self) -> bool {
        self.messages.iter().any(|m| m.failed)
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        if self.is_empty() {
            return vec![Line::from(Span::styled(
                "Ask anything about your tasks or spending.",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let mut lines = Vec::new();
        for message in &self.messages {
            let (speaker, color) = match message.role {
                ChatRole::User => ("You", Color::Cyan),
                ChatRole::Assistant => ("AI", Color::Magenta),
            };
            let mut spans = vec![
                Span::styled(
                    format!("{}: ", speaker),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(message.text.clone()),
            ];
            if message.failed {
                spans.push(Span::styled(
                    "  (not sent, Ctrl+R to retry)",
                    Style::default().fg(Color::Red),
                ));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let lines = self.build_lines();
        // Approximate: wrapped lines may push the newest message below the fold.
        let visible = area.height.saturating_sub(2) as usize;
        let offset = lines.len().saturating_sub(visible) as u16;

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" AI Assistant "),
            )
            .wrap(Wrap { trim: false })
            .scroll((offset, 0));
        frame.render_widget(paragraph, area);
    }
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}
