mod chat;
mod expense;
mod loadable;
mod session;
mod task;

pub use chat::{
    ChatMessage, ChatReply, ChatRequest, ChatRole, ModalContent, SuggestionReply, Transcript,
};
pub use expense::{format_currency, parse_amount, BudgetStatus, Expense, ExpenseSummary, NewExpense};
pub use loadable::Loadable;
pub use session::{AuthMode, AuthResponse, AuthState, Credentials, Session, User};
pub use task::{pending_count, NewTask, Task, TaskPatch};
