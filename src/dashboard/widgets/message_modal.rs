use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::ModalContent;

/// Overlay for assistant output. A later `show` replaces the body in place,
/// so a placeholder turns into the result without flicker.
pub struct MessageModal {
    content: Option<ModalContent>,
}

impl MessageModal {
    pub fn new() -> Self {
        Self { content: None }
    }

    pub fn show(&mut self, content: ModalContent) {
        self.content = Some(content);
    }

    pub fn hide(&mut self) {
        self.content = None;
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }

    #[cfg(test)]
    pub fn content(&self) -> Option<&ModalContent> {
        self.content.as_ref()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(content) = &self.content else {
            return;
        };

        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(Span::styled(
                format!(" {} ", content.title),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner_area);

        let body = Paragraph::new(content.body.as_str()).wrap(Wrap { trim: false });
        frame.render_widget(body, chunks[0]);

        let hint = Line::from(vec![
            Span::styled("Esc / Enter", Style::default().fg(Color::Yellow)),
            Span::raw(": Close"),
        ]);
        frame.render_widget(Paragraph::new(hint), chunks[1]);
    }
}

impl Default for MessageModal {
    fn default() -> Self {
        Self::new()
    }
}
