use super::router::{Section, View};
use crate::models::{AuthMode, AuthState, ChatMessage, Expense, ExpenseSummary, ModalContent, Task, User};

/// A command emitted by a front-end.
#[derive(Clone, PartialEq)]
pub enum Intent {
    Restore,
    Login { email: String, password: String },
    Register { email: String, password: String },
    SetAuthMode(AuthMode),
    Logout,
    ShowSection(Section),
    RefreshAll,
    RefreshTasks,
    CreateTask(String),
    ToggleTask { id: String, completed: bool },
    /// Asks for confirmation first; nothing is sent until `ConfirmPending`.
    DeleteTask(String),
    ConfirmPending,
    CancelPending,
    RefreshExpenses,
    CreateExpense { category: String, amount_text: String },
    Suggest,
    Analyze,
    SendChat(String),
    RetryChat,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Restore => "restore",
            Intent::Login { .. } => "login",
            Intent::Register { .. } => "register",
            Intent::SetAuthMode(_) => "set_auth_mode",
            Intent::Logout => "logout",
            Intent::ShowSection(_) => "show_section",
            Intent::RefreshAll => "refresh_all",
            Intent::RefreshTasks => "refresh_tasks",
            Intent::CreateTask(_) => "create_task",
            Intent::ToggleTask { .. } => "toggle_task",
            Intent::DeleteTask(_) => "delete_task",
            Intent::ConfirmPending => "confirm_pending",
            Intent::CancelPending => "cancel_pending",
            Intent::RefreshExpenses => "refresh_expenses",
            Intent::CreateExpense { .. } => "create_expense",
            Intent::Suggest => "suggest",
            Intent::Analyze => "analyze",
            Intent::SendChat(_) => "send_chat",
            Intent::RetryChat => "retry_chat",
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Login { email, .. } | Intent::Register { email, .. } => f
                .debug_struct(self.name())
                .field("email", email)
                .finish_non_exhaustive(),
            other => f.write_str(other.name()),
        }
    }
}

/// A state change for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Session { state: AuthState, user: Option<User> },
    AuthMode(AuthMode),
    View(View),
    Tasks(Vec<Task>),
    Expenses { expenses: Vec<Expense>, summary: ExpenseSummary },
    Transcript(Vec<ChatMessage>),
    Modal(ModalContent),
    ConfirmRequested(String),
    Info(String),
    Error(String),
}
