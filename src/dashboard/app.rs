use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Stdout;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use super::ui::UI;
use super::widgets::{
    AuthField, AuthForm, ChatPanel, ConfirmDialog, ExpensePanel, HelpModal, MessageModal,
    TaskList, TextInput,
};
use crate::api::{HttpTransport, ReqwestTransport};
use crate::dispatch::{Dispatcher, Intent, Notification, Section, View};
use crate::models::{parse_amount, AuthMode, AuthState, Expense, Task, User};

const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    Category,
    Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Terminal front-end. Keys become [`Intent`]s, notifications become state.
pub struct DashboardApp<T: HttpTransport = ReqwestTransport> {
    dispatcher: Dispatcher<T>,
    notifications: UnboundedReceiver<Notification>,
    api_base: String,
    running: bool,
    view: View,
    user: Option<User>,
    outbox: Vec<Intent>,

    auth_form: AuthForm,
    task_list: TaskList,
    task_input: TextInput,
    expense_panel: ExpensePanel,
    category_input: TextInput,
    amount_input: TextInput,
    expense_field: ExpenseField,
    chat_panel: ChatPanel,
    chat_input: TextInput,
    message_modal: MessageModal,
    confirm_dialog: ConfirmDialog,
    help_modal: HelpModal,

    message: Option<StatusMessage>,
    // Inputs are cleared once the created record shows up, kept on error.
    pending_task: Option<Submitted<String>>,
    pending_expense: Option<Submitted<(String, f64)>>,
}

/// A create waiting to be seen in a refreshed list. `seen` counts equal
/// records the list already held at submit time.
struct Submitted<K> {
    key: K,
    seen: usize,
}

impl<K> Submitted<K> {
    fn arrived(&self, now: usize) -> bool {
        now > self.seen
    }
}

fn titled(tasks: &[Task], title: &str) -> usize {
    tasks.iter().filter(|t| t.title == title).count()
}

fn matching(expenses: &[Expense], (category, amount): &(String, f64)) -> usize {
    expenses
        .iter()
        .filter(|e| e.category == *category && (e.amount - amount).abs() < 0.005)
        .count()
}

impl<T: HttpTransport> DashboardApp<T> {
    pub fn new(
        dispatcher: Dispatcher<T>,
        notifications: UnboundedReceiver<Notification>,
        api_base: String,
    ) -> Self {
        let mut app = Self {
            dispatcher,
            notifications,
            api_base,
            running: true,
            view: View::Auth {
                mode: AuthMode::Login,
                verifying: false,
            },
            user: None,
            outbox: vec![Intent::Restore],
            auth_form: AuthForm::new(),
            task_list: TaskList::new(),
            task_input: TextInput::new("New task title..."),
            expense_panel: ExpensePanel::new(),
            category_input: TextInput::new("e.g. food"),
            amount_input: TextInput::new("e.g. 12.50"),
            expense_field: ExpenseField::Category,
            chat_panel: ChatPanel::new(),
            chat_input: TextInput::new("Ask the assistant..."),
            message_modal: MessageModal::new(),
            confirm_dialog: ConfirmDialog::new(),
            help_modal: HelpModal::new(),
            message: None,
            pending_task: None,
            pending_expense: None,
        };
        app.update_focus();
        app
    }

    pub fn start_in_register_mode(&mut self) {
        self.auth_form.set_mode(AuthMode::Register);
        self.outbox.insert(0, Intent::SetAuthMode(AuthMode::Register));
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn auth_form(&self) -> &AuthForm {
        &self.auth_form
    }

    pub fn task_list(&mut self) -> &mut TaskList {
        &mut self.task_list
    }

    pub fn task_input(&self) -> &TextInput {
        &self.task_input
    }

    pub fn expense_panel(&self) -> &ExpensePanel {
        &self.expense_panel
    }

    pub fn category_input(&self) -> &TextInput {
        &self.category_input
    }

    pub fn amount_input(&self) -> &TextInput {
        &self.amount_input
    }

    pub fn chat_panel(&self) -> &ChatPanel {
        &self.chat_panel
    }

    pub fn chat_input(&self) -> &TextInput {
        &self.chat_input
    }

    pub fn message_modal(&self) -> &MessageModal {
        &self.message_modal
    }

    pub fn confirm_dialog(&self) -> &ConfirmDialog {
        &self.confirm_dialog
    }

    pub fn help_modal(&self) -> &HelpModal {
        &self.help_modal
    }

    fn set_message(&mut self, text: String, is_error: bool) {
        self.message = Some(StatusMessage { text, is_error });
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn send(&mut self, intent: Intent) {
        self.outbox.push(intent);
    }

    fn flush_intents(&mut self) {
        for intent in std::mem::take(&mut self.outbox) {
            tracing::debug!("Dispatching {:?}", intent);
            self.dispatcher.dispatch(intent);
        }
    }

    fn drain_notifications(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            self.apply(notification);
        }
    }

    fn update_focus(&mut self) {
        let section = match self.view {
            View::Dashboard(section) => Some(section),
            View::Auth { .. } => None,
        };
        self.task_input.set_focused(section == Some(Section::Tasks));
        self.chat_input.set_focused(section == Some(Section::Assistant));
        let expenses = section == Some(Section::Expenses);
        self.category_input
            .set_focused(expenses && self.expense_field == ExpenseField::Category);
        self.amount_input
            .set_focused(expenses && self.expense_field == ExpenseField::Amount);
    }

    fn reset_data(&mut self) {
        self.task_list.reset();
        self.task_input.clear();
        self.expense_panel.reset();
        self.category_input.clear();
        self.amount_input.clear();
        self.expense_field = ExpenseField::Category;
        self.chat_panel.reset();
        self.chat_input.clear();
        self.message_modal.hide();
        self.confirm_dialog.hide();
        self.pending_task = None;
        self.pending_expense = None;
    }

    /// Applies one state change from the dispatcher.
    pub fn apply(&mut self, notification: Notification) {
        match notification {
            Notification::Session { state, user } => {
                self.auth_form.set_verifying(state == AuthState::Verifying);
                if state == AuthState::Authenticated {
                    self.auth_form.reset();
                } else {
                    self.reset_data();
                }
                self.user = user;
            }
            Notification::AuthMode(mode) => {
                self.auth_form.set_mode(mode);
                self.auth_form.clear_password();
            }
            Notification::View(view) => {
                if let View::Auth { mode, verifying } = view {
                    self.auth_form.set_mode(mode);
                    self.auth_form.set_verifying(verifying);
                }
                self.view = view;
                self.update_focus();
            }
            Notification::Tasks(tasks) => {
                let created = self
                    .pending_task
                    .as_ref()
                    .is_some_and(|p| p.arrived(titled(&tasks, &p.key)));
                self.task_list.set_tasks(tasks);
                if created {
                    self.pending_task = None;
                    self.task_input.clear();
                }
            }
            Notification::Expenses { expenses, summary } => {
                let created = self
                    .pending_expense
                    .as_ref()
                    .is_some_and(|p| p.arrived(matching(&expenses, &p.key)));
                self.expense_panel.set_data(expenses, summary);
                if created {
                    self.pending_expense = None;
                    self.category_input.clear();
                    self.amount_input.clear();
                    self.expense_field = ExpenseField::Category;
                    self.update_focus();
                }
            }
            Notification::Transcript(messages) => self.chat_panel.set_messages(messages),
            Notification::Modal(content) => self.message_modal.show(content),
            Notification::ConfirmRequested(prompt) => self.confirm_dialog.show(prompt),
            Notification::Info(text) => self.set_message(text, false),
            Notification::Error(text) => {
                self.pending_task = None;
                self.pending_expense = None;
                self.set_message(text, true);
            }
        }
    }

    pub fn handle_events(&mut self) -> Result<()> {
        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        tracing::trace!("Key pressed: {:?}", key.code);

        self.clear_message();

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.quit();
                    return;
                }
                KeyCode::Char('h') => {
                    self.help_modal.toggle();
                    return;
                }
                _ => {}
            }
        }

        if self.help_modal.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.help_modal.hide();
            }
            return;
        }

        if self.confirm_dialog.is_visible() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm_dialog.hide();
                    self.send(Intent::ConfirmPending);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_dialog.hide();
                    self.send(Intent::CancelPending);
                }
                _ => {}
            }
            return;
        }

        if self.message_modal.is_visible() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.message_modal.hide();
            }
            return;
        }

        match self.view {
            View::Auth { .. } => self.handle_auth_keys(key.code, ctrl),
            View::Dashboard(section) => self.handle_dashboard_keys(section, key.code, ctrl),
        }
    }

    fn handle_auth_keys(&mut self, code: KeyCode, ctrl: bool) {
        if self.auth_form.is_verifying() {
            return;
        }
        if ctrl {
            if code == KeyCode::Char('r') {
                self.send(Intent::SetAuthMode(self.auth_form.mode().toggled()));
            }
            return;
        }
        match code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.auth_form.next_field()
            }
            KeyCode::Enter => self.submit_auth(),
            other => edit_input(self.auth_form.input_mut(), other),
        }
    }

    fn submit_auth(&mut self) {
        if self.auth_form.field() == AuthField::Email && !self.auth_form.has_password() {
            self.auth_form.next_field();
            return;
        }
        let email = self.auth_form.email().trim().to_string();
        let password = self.auth_form.password().to_string();
        let intent = match self.auth_form.mode() {
            AuthMode::Login => Intent::Login { email, password },
            AuthMode::Register => Intent::Register { email, password },
        };
        self.send(intent);
    }

    fn handle_dashboard_keys(&mut self, section: Section, code: KeyCode, ctrl: bool) {
        let global = match code {
            KeyCode::F(1) => Some(Intent::ShowSection(Section::Tasks)),
            KeyCode::F(2) => Some(Intent::ShowSection(Section::Expenses)),
            KeyCode::F(3) => Some(Intent::ShowSection(Section::Assistant)),
            KeyCode::F(5) => Some(Intent::RefreshAll),
            KeyCode::F(6) => Some(Intent::Suggest),
            KeyCode::F(7) => Some(Intent::Analyze),
            KeyCode::Char('t') if ctrl => Some(Intent::ShowSection(section.next())),
            KeyCode::Char('l') if ctrl => Some(Intent::Logout),
            _ => None,
        };
        if let Some(intent) = global {
            self.send(intent);
            return;
        }

        match section {
            Section::Tasks => self.handle_task_keys(code, ctrl),
            Section::Expenses => self.handle_expense_keys(code, ctrl),
            Section::Assistant => self.handle_chat_keys(code, ctrl),
        }
    }

    fn handle_task_keys(&mut self, code: KeyCode, ctrl: bool) {
        if ctrl {
            match code {
                KeyCode::Char('o') => self.toggle_selected_task(),
                KeyCode::Char('d') => self.delete_selected_task(),
                _ => {}
            }
            return;
        }
        match code {
            KeyCode::Up => self.task_list.prev(),
            KeyCode::Down => self.task_list.next(),
            KeyCode::Enter => {
                let title = self.task_input.content().trim().to_string();
                self.pending_task = (!title.is_empty()).then(|| Submitted {
                    seen: titled(self.task_list.rows(), &title),
                    key: title,
                });
                self.send(Intent::CreateTask(self.task_input.content().to_string()));
            }
            other => edit_input(&mut self.task_input, other),
        }
    }

    fn toggle_selected_task(&mut self) {
        let Some(task) = self.task_list.selected_task() else {
            self.set_message("No task selected".to_string(), false);
            return;
        };
        let intent = Intent::ToggleTask {
            id: task.id.clone(),
            completed: !task.completed,
        };
        self.send(intent);
    }

    fn delete_selected_task(&mut self) {
        let Some(task) = self.task_list.selected_task() else {
            self.set_message("No task selected".to_string(), false);
            return;
        };
        let intent = Intent::DeleteTask(task.id.clone());
        self.send(intent);
    }

    fn handle_expense_keys(&mut self, code: KeyCode, ctrl: bool) {
        if ctrl {
            return;
        }
        match code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.expense_field = match self.expense_field {
                    ExpenseField::Category => ExpenseField::Amount,
                    ExpenseField::Amount => ExpenseField::Category,
                };
                self.update_focus();
            }
            KeyCode::Enter => {
                let category = self.category_input.content().trim().to_string();
                self.pending_expense = parse_amount(self.amount_input.content())
                    .filter(|_| !category.is_empty())
                    .map(|amount| {
                        let key = (category, amount);
                        Submitted {
                            seen: matching(self.expense_panel.expenses(), &key),
                            key,
                        }
                    });
                self.send(Intent::CreateExpense {
                    category: self.category_input.content().to_string(),
                    amount_text: self.amount_input.content().to_string(),
                });
            }
            other => {
                let input = match self.expense_field {
                    ExpenseField::Category => &mut self.category_input,
                    ExpenseField::Amount => &mut self.amount_input,
                };
                edit_input(input, other);
            }
        }
    }

    fn handle_chat_keys(&mut self, code: KeyCode, ctrl: bool) {
        if ctrl {
            if code == KeyCode::Char('r') {
                self.send(Intent::RetryChat);
            }
            return;
        }
        match code {
            KeyCode::Enter => {
                self.send(Intent::SendChat(self.chat_input.content().to_string()));
                if !self.chat_input.is_empty() {
                    self.chat_input.clear();
                }
            }
            other => edit_input(&mut self.chat_input, other),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = UI::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        UI::restore_terminal()?;
        tracing::info!("Dashboard closed");
        result
    }

    async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while self.is_running() {
            self.flush_intents();
            self.drain_notifications();
            terminal.draw(|frame| UI::render(frame, self))?;
            self.handle_events()?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

fn edit_input(input: &mut TextInput, code: KeyCode) {
    match code {
        KeyCode::Char(c) => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_forward(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_cursor_start(),
        KeyCode::End => input.move_cursor_end(),
        _ => {}
    }
}
