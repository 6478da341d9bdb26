use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::{format_currency, BudgetStatus, Expense, ExpenseSummary, Loadable};

const CATEGORY_WIDTH: usize = 16;

pub struct ExpensePanel {
    data: Loadable<(Vec<Expense>, ExpenseSummary)>,
}

impl ExpensePanel {
    pub fn new() -> Self {
        Self {
            data: Loadable::NotLoaded,
        }
    }

    pub fn set_data(&mut self, expenses: Vec<Expense>, summary: ExpenseSummary) {
        self.data = Loadable::Loaded((expenses, summary));
    }

    pub fn reset(&mut self) {
        self.data = Loadable::NotLoaded;
    }

    pub fn expenses(&self) -> &[Expense] {
        self.data
            .as_ref()
            .map(|(expenses, _)| expenses.as_slice())
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.data.is_loaded()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let (history, summary) = match &self.data {
            Loadable::NotLoaded => (Self::loading_lines(), Self::loading_lines()),
            Loadable::Loaded((expenses, summary)) => {
                (Self::history_lines(expenses), Self::summary_lines(summary))
            }
        };

        frame.render_widget(
            Paragraph::new(history).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Recent Expenses "),
            ),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(summary).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Summary "),
            ),
            chunks[1],
        );
    }

    fn loading_lines() -> Vec<Line<'static>> {
        vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        ))]
    }

    fn history_lines(expenses: &[Expense]) -> Vec<Line<'static>> {
        if expenses.is_empty() {
            return vec![Line::from(Span::styled(
                "No expenses recorded.",
                Style::default().fg(Color::DarkGray),
            ))];
        }
        expenses
            .iter()
            .map(|expense| {
                Line::from(vec![
                    Span::styled(
                        expense.created_at.format("%m-%d ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(fit_width(&expense.category, CATEGORY_WIDTH)),
                    Span::styled(
                        format!(" {:>10}", format_currency(expense.amount)),
                        Style::default().fg(Color::Yellow),
                    ),
                ])
            })
            .collect()
    }

    fn summary_lines(summary: &ExpenseSummary) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![
                Span::raw("Total: "),
                Span::styled(
                    format_currency(summary.total_spending),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        for share in summary.shares() {
            lines.push(Line::from(vec![
                Span::raw(fit_width(&share.category, CATEGORY_WIDTH)),
                Span::styled(
                    format!(" {:>10}", format_currency(share.amount)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!(" {:>5.1}%", share.percent),
                    Style::default().fg(Color::Gray),
                ),
            ]));
        }

        let status = summary.budget_status();
        let color = match status {
            BudgetStatus::High => Color::Red,
            BudgetStatus::Moderate => Color::Yellow,
            BudgetStatus::UnderControl => Color::Green,
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status.advice(),
            Style::default().fg(color),
        )));
        lines
    }
}

impl Default for ExpensePanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncates with an ellipsis or pads with spaces to exactly `width` columns.
fn fit_width(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }
    if width == 0 {
        return String::new();
    }
    let mut fitted = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        fitted.push(ch);
        used += ch_width;
    }
    fitted.push('…');
    used += 1;
    fitted.push_str(&" ".repeat(width.saturating_sub(used)));
    fitted
}
