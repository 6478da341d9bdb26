use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::TextInput;
use crate::models::AuthMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
}

/// Sign-in / registration form.
pub struct AuthForm {
    mode: AuthMode,
    verifying: bool,
    field: AuthField,
    email: TextInput,
    password: TextInput,
}

impl AuthForm {
    pub fn new() -> Self {
        let mut form = Self {
            mode: AuthMode::Login,
            verifying: false,
            field: AuthField::Email,
            email: TextInput::new("you@example.com"),
            password: TextInput::new("password").masked(),
        };
        form.update_focus();
        form
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn set_verifying(&mut self, verifying: bool) {
        self.verifying = verifying;
    }

    pub fn field(&self) -> AuthField {
        self.field
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
        self.update_focus();
    }

    fn update_focus(&mut self) {
        self.email.set_focused(self.field == AuthField::Email);
        self.password.set_focused(self.field == AuthField::Password);
    }

    pub fn input_mut(&mut self) -> &mut TextInput {
        match self.field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    pub fn email(&self) -> &str {
        self.email.content()
    }

    pub fn password(&self) -> &str {
        self.password.content()
    }

    pub fn has_password(&self) -> bool {
        !self.password.content().is_empty()
    }

    pub fn clear_password(&mut self) {
        self.password.clear();
    }

    pub fn reset(&mut self) {
        self.email.clear();
        self.password.clear();
        self.field = AuthField::Email;
        self.update_focus();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                format!(" {} ", self.mode.title()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner_area);

        self.email.render(frame, chunks[0], "Email");
        self.password.render(frame, chunks[1], "Password");

        let status = if self.verifying {
            Line::from(Span::styled(
                "Verifying saved session...",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            let switch = match self.mode {
                AuthMode::Login => "Ctrl+R: Create an account",
                AuthMode::Register => "Ctrl+R: Back to sign in",
            };
            Line::from(Span::styled(switch, Style::default().fg(Color::DarkGray)))
        };
        frame.render_widget(
            Paragraph::new(status).alignment(Alignment::Center),
            chunks[2],
        );
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}
