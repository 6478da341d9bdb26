use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Single-line editor. The cursor counts characters, not bytes.
pub struct TextInput {
    content: String,
    cursor_position: usize,
    focused: bool,
    masked: bool,
    placeholder: &'static str,
}

impl TextInput {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            content: String::new(),
            cursor_position: 0,
            focused: false,
            masked: false,
            placeholder,
        }
    }

    /// Renders every character as `*`.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[cfg(test)]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    #[cfg(test)]
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor_position = self.char_count();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor_position);
        self.content.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index(self.cursor_position);
            self.content.remove(index);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_position < self.char_count() {
            let index = self.byte_index(self.cursor_position);
            self.content.remove(index);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    fn display_text(&self) -> String {
        if self.masked {
            "*".repeat(self.char_count())
        } else {
            self.content.clone()
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let text_style = if self.focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };

        let line = if self.content.is_empty() && !self.focused {
            Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            ))
        } else if self.focused {
            let text = self.display_text();
            let split = text
                .char_indices()
                .nth(self.cursor_position)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            let (before, after) = text.split_at(split);

            Line::from(vec![
                Span::styled(before.to_string(), text_style),
                Span::styled(
                    "│",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::SLOW_BLINK),
                ),
                Span::styled(after.to_string(), text_style),
            ])
        } else {
            Line::from(Span::styled(self.display_text(), text_style))
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title.to_string()),
        );

        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_input_empty_by_default() {
        let input = TextInput::new("...");
        assert!(input.is_empty());
        assert_eq!(input.content(), "");
    }

    #[test]
    fn text_input_insert_char() {
        let mut input = TextInput::new("...");
        input.insert_char('H');
        input.insert_char('i');
        assert_eq!(input.content(), "Hi");
    }

    #[test]
    fn text_input_delete_at_start_does_nothing() {
        let mut input = TextInput::new("...");
        input.set_content("Hello");
        input.move_cursor_start();

        input.delete_char();
        assert_eq!(input.content(), "Hello");
    }

    #[test]
    fn text_input_delete_forward_removes_under_cursor() {
        let mut input = TextInput::new("...");
        input.set_content("Hello");
        input.move_cursor_start();

        input.delete_forward();
        assert_eq!(input.content(), "ello");

        input.move_cursor_end();
        input.delete_forward();
        assert_eq!(input.content(), "ello");
    }

    #[test]
    fn text_input_cursor_movement() {
        let mut input = TextInput::new("...");
        input.set_content("Hello");
        assert_eq!(input.cursor_position, 5);

        input.move_cursor_left();
        assert_eq!(input.cursor_position, 4);

        input.move_cursor_start();
        assert_eq!(input.cursor_position, 0);

        input.move_cursor_right();
        assert_eq!(input.cursor_position, 1);

        input.move_cursor_end();
        assert_eq!(input.cursor_position, 5);
    }

    #[test]
    fn text_input_edits_multibyte_text() {
        let mut input = TextInput::new("...");
        input.set_content("café");
        input.move_cursor_left();
        input.insert_char('x');
        assert_eq!(input.content(), "cafxé");

        input.move_cursor_end();
        input.delete_char();
        assert_eq!(input.content(), "cafx");
    }

    #[test]
    fn text_input_whitespace_counts_as_empty() {
        let mut input = TextInput::new("...");
        input.set_content("   ");
        assert!(input.is_empty());
    }

    #[test]
    fn masked_input_hides_content() {
        let mut input = TextInput::new("...").masked();
        input.set_content("pw");
        assert_eq!(input.display_text(), "**");
        assert_eq!(input.content(), "pw");
    }

    #[test]
    fn text_input_clear() {
        let mut input = TextInput::new("...");
        input.set_content("Hello");

        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.cursor_position, 0);
    }
}
