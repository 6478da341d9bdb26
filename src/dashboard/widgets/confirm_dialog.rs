use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Yes/no question shown before a destructive action.
pub struct ConfirmDialog {
    prompt: Option<String>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self { prompt: None }
    }

    pub fn show(&mut self, prompt: String) {
        self.prompt = Some(prompt);
    }

    pub fn hide(&mut self) {
        self.prompt = None;
    }

    pub fn is_visible(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(prompt) = &self.prompt else {
            return;
        };

        frame.render_widget(Clear, area);

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                prompt.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(Color::Yellow)),
                Span::raw(": Yes   "),
                Span::styled("n / Esc", Style::default().fg(Color::Yellow)),
                Span::raw(": No"),
            ]),
        ];

        let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Confirm "),
        );
        frame.render_widget(paragraph, area);
    }
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_visibility_follows_prompt() {
        let mut dialog = ConfirmDialog::new();
        assert!(!dialog.is_visible());

        dialog.show("Are you sure?".to_string());
        assert!(dialog.is_visible());

        dialog.hide();
        assert!(!dialog.is_visible());
    }
}
