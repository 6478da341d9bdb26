use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub struct HelpModal {
    visible: bool,
}

impl HelpModal {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Help ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(self.build_help_lines()), inner_area);
    }

    fn build_help_lines(&self) -> Vec<Line<'static>> {
        vec![
            Self::section_title("Keyboard Shortcuts", Color::Cyan),
            Line::from(""),
            Self::subsection_title("Global"),
            Self::key_line("Ctrl+C / Ctrl+Q", "Quit application"),
            Self::key_line("Ctrl+H", "Toggle this help"),
            Self::key_line("Esc", "Close dialog / clear message"),
            Line::from(""),
            Self::subsection_title("Sign In"),
            Self::key_line("Tab / \u{2191} / \u{2193}", "Switch between email and password"),
            Self::key_line("Ctrl+R", "Toggle sign in / create account"),
            Self::key_line("Enter", "Submit"),
            Line::from(""),
            Self::subsection_title("Dashboard"),
            Self::key_line("F1 / F2 / F3", "Tasks / Expenses / AI Assistant"),
            Self::key_line("Ctrl+T", "Next section"),
            Self::key_line("F5", "Refresh tasks and expenses"),
            Self::key_line("F6", "AI smart suggestion"),
            Self::key_line("F7", "AI spending analysis"),
            Self::key_line("Ctrl+L", "Sign out"),
            Self::nested_subsection_title("Tasks"),
            Self::key_line("\u{2191} / \u{2193}", "Select previous / next task"),
            Self::key_line("Enter", "Add task from input"),
            Self::key_line("Ctrl+O", "Toggle completed"),
            Self::key_line("Ctrl+D", "Delete selected task"),
            Self::nested_subsection_title("Expenses"),
            Self::key_line("Tab", "Switch between category and amount"),
            Self::key_line("Enter", "Record expense"),
            Self::nested_subsection_title("AI Assistant"),
            Self::key_line("Enter", "Send message"),
            Self::key_line("Ctrl+R", "Retry last failed message"),
            Line::from(""),
            Line::from(Span::styled(
                "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(vec![
                Span::styled("Enter / q", Style::default().fg(Color::Yellow)),
                Span::raw(": Close this help"),
            ]),
        ]
    }

    fn section_title(title: &'static str, color: Color) -> Line<'static> {
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    }

    fn subsection_title(title: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            format!("━━━ {} ━━━", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn nested_subsection_title(title: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("── {} ──", title),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }

    fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:20}", key), Style::default().fg(Color::Yellow)),
            Span::raw(description),
        ])
    }
}

impl Default for HelpModal {
    fn default() -> Self {
        Self::new()
    }
}
