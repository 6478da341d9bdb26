use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use super::app::DashboardApp;
use crate::api::HttpTransport;
use crate::dispatch::{Section, View};

pub struct UI;

impl UI {
    pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
    }

    pub fn restore_terminal() -> io::Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn render<T: HttpTransport>(frame: &mut Frame, app: &mut DashboardApp<T>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(frame.area());

        Self::render_header(frame, chunks[0], app);
        match app.view() {
            View::Auth { .. } => {
                let form_area = Self::centered_area(chunks[1], 60, 70);
                app.auth_form().render(frame, form_area);
            }
            View::Dashboard(section) => Self::render_section(frame, chunks[1], app, section),
        }
        Self::render_footer(frame, chunks[2], app);

        if app.confirm_dialog().is_visible() {
            let area = Self::centered_area(frame.area(), 40, 30);
            app.confirm_dialog().render(frame, area);
        }
        if app.message_modal().is_visible() {
            let area = Self::centered_area(frame.area(), 70, 60);
            app.message_modal().render(frame, area);
        }
        if app.help_modal().is_visible() {
            let area = Self::centered_area(frame.area(), 80, 90);
            app.help_modal().render(frame, area);
        }
    }

    fn centered_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }

    fn render_section<T: HttpTransport>(
        frame: &mut Frame,
        area: Rect,
        app: &mut DashboardApp<T>,
        section: Section,
    ) {
        match section {
            Section::Tasks => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(3)])
                    .split(area);
                app.task_list().render(frame, chunks[0]);
                app.task_input().render(frame, chunks[1], "New Task (Enter to add)");
            }
            Section::Expenses => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(3)])
                    .split(area);
                app.expense_panel().render(frame, chunks[0]);

                let inputs = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[1]);
                app.category_input().render(frame, inputs[0], "Category");
                app.amount_input().render(frame, inputs[1], "Amount");
            }
            Section::Assistant => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(3)])
                    .split(area);
                app.chat_panel().render(frame, chunks[0]);
                app.chat_input().render(frame, chunks[1], "Message (Enter to send)");
            }
        }
    }

    fn render_header<T: HttpTransport>(frame: &mut Frame, area: Rect, app: &DashboardApp<T>) {
        let mut title = vec![Span::styled(
            " PADASH ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];

        if area.width >= 100 {
            title.push(Span::raw(" - Personal Assistant Dashboard "));
        }
        title.push(Span::raw("| "));

        match app.view() {
            View::Dashboard(current) => {
                for (i, section) in Section::ALL.iter().enumerate() {
                    let style = if *section == current {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    title.push(Span::styled(
                        format!(" F{} {} ", i + 1, section.title()),
                        style,
                    ));
                    title.push(Span::raw(" "));
                }
                title.push(Span::raw("| "));
            }
            View::Auth { mode, .. } => {
                title.push(Span::styled(
                    format!("{} ", mode.title()),
                    Style::default().fg(Color::Yellow),
                ));
                title.push(Span::raw("| "));
            }
        }

        match app.user() {
            Some(user) => title.push(Span::styled(
                user.email.clone(),
                Style::default().fg(Color::Green),
            )),
            None => title.push(Span::styled(
                app.api_base().to_string(),
                Style::default().fg(Color::DarkGray),
            )),
        }

        let header = Paragraph::new(Line::from(title)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(header, area);
    }

    fn render_footer<T: HttpTransport>(frame: &mut Frame, area: Rect, app: &DashboardApp<T>) {
        let mut help_text = Vec::new();

        if let Some(message) = app.message() {
            let style = if message.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            help_text.push(Span::styled(format!("{} | ", message.text), style));
        }

        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

        match app.view() {
            View::Auth { .. } => {
                help_text.extend([key("Tab"), Span::raw(": Next field ")]);
                help_text.extend([key("Ctrl+R"), Span::raw(": Switch form ")]);
            }
            View::Dashboard(section) => {
                help_text.extend([key("F1-F3"), Span::raw(": Section ")]);
                match section {
                    Section::Tasks => {
                        help_text.extend([key("Ctrl+O"), Span::raw(": Done/Undo ")]);
                        help_text.extend([key("Ctrl+D"), Span::raw(": Delete ")]);
                    }
                    Section::Expenses => {
                        help_text.extend([key("Tab"), Span::raw(": Next field ")]);
                    }
                    Section::Assistant => {
                        if app.chat_panel().has_failed() {
                            help_text.extend([key("Ctrl+R"), Span::raw(": Retry ")]);
                        }
                    }
                }
                help_text.extend([key("F6/F7"), Span::raw(": AI ")]);
                help_text.extend([key("Ctrl+L"), Span::raw(": Sign out ")]);
            }
        }

        help_text.extend([key("Ctrl+H"), Span::raw(": Help ")]);
        help_text.extend([key("Ctrl+Q"), Span::raw(": Quit")]);

        let footer = Paragraph::new(Line::from(help_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

        frame.render_widget(footer, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_area_stays_inside_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let area = UI::centered_area(parent, 60, 50);

        assert_eq!(area.width, 60);
        assert_eq!(area.height, 20);
        assert_eq!(area.x, 20);
        assert_eq!(area.y, 10);
    }
}
