use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{pending_count, Loadable, Task};

pub struct TaskList {
    tasks: Loadable<Vec<Task>>,
    state: ListState,
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            tasks: Loadable::NotLoaded,
            state: ListState::default(),
        }
    }

    pub fn rows(&self) -> &[Task] {
        self.tasks.as_ref().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the list, keeping the selection on the same task when it survives.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        let selected_id = self.selected_task().map(|t| t.id.clone());
        let index = match selected_id {
            Some(id) => tasks
                .iter()
                .position(|t| t.id == id)
                .or_else(|| self.state.selected().map(|i| i.min(tasks.len().saturating_sub(1)))),
            None => Some(0),
        };
        self.state
            .select(if tasks.is_empty() { None } else { index });
        self.tasks = Loadable::Loaded(tasks);
    }

    pub fn reset(&mut self) {
        self.tasks = Loadable::NotLoaded;
        self.state.select(None);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.rows().get(i))
    }

    /// `None` until the first load.
    pub fn pending(&self) -> Option<usize> {
        self.tasks.as_ref().map(|tasks| pending_count(tasks))
    }

    pub fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn prev(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn title(&self) -> String {
        match self.pending() {
            Some(pending) => format!(" Tasks ({} pending) ", pending),
            None => " Tasks ".to_string(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(self.title());

        let tasks = match &self.tasks {
            Loadable::NotLoaded => {
                let loading = Paragraph::new(Span::styled(
                    "Loading...",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block);
                frame.render_widget(loading, area);
                return;
            }
            Loadable::Loaded(tasks) if tasks.is_empty() => {
                let empty = Paragraph::new(Span::styled(
                    "No tasks yet. Type a title below and press Enter.",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block);
                frame.render_widget(empty, area);
                return;
            }
            Loadable::Loaded(tasks) => tasks,
        };

        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| {
                let (checkbox_style, title_style) = if task.completed {
                    (
                        Style::default().fg(Color::Green),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    (Style::default().fg(Color::Gray), Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", task.checkbox()), checkbox_style),
                    Span::styled(task.title.clone(), title_style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            completed,
            created_at: None,
        }
    }

    #[test]
    fn pending_is_unknown_before_first_load() {
        let mut list = TaskList::new();
        assert_eq!(list.pending(), None);
        assert_eq!(list.title(), " Tasks ");

        list.set_tasks(vec![task("1", false), task("2", true)]);
        assert_eq!(list.pending(), Some(1));
        assert_eq!(list.title(), " Tasks (1 pending) ");
    }

    #[test]
    fn first_load_selects_first_task() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", false), task("2", false)]);
        assert_eq!(list.selected_task().map(|t| t.id.as_str()), Some("1"));
    }

    #[test]
    fn selection_wraps_around() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", false), task("2", false)]);

        list.prev();
        assert_eq!(list.selected_task().map(|t| t.id.as_str()), Some("2"));

        list.next();
        assert_eq!(list.selected_task().map(|t| t.id.as_str()), Some("1"));
    }

    #[test]
    fn selection_follows_task_across_reload() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", false), task("2", false)]);
        list.next();

        list.set_tasks(vec![task("0", false), task("1", false), task("2", true)]);
        assert_eq!(list.selected_task().map(|t| t.id.as_str()), Some("2"));
    }

    #[test]
    fn selection_clamps_when_selected_task_is_deleted() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", false), task("2", false)]);
        list.next();

        list.set_tasks(vec![task("1", false)]);
        assert_eq!(list.selected_task().map(|t| t.id.as_str()), Some("1"));

        list.set_tasks(vec![]);
        assert!(list.selected_task().is_none());
        list.next();
        assert!(list.selected_task().is_none());
    }

    #[test]
    fn reset_forgets_tasks() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", false)]);
        list.reset();
        assert_eq!(list.pending(), None);
        assert!(list.selected_task().is_none());
    }
}
