mod auth_form;
mod chat_panel;
mod confirm_dialog;
mod expense_panel;
mod help_modal;
mod message_modal;
mod task_list;
mod text_input;

pub use auth_form::{AuthField, AuthForm};
pub use chat_panel::ChatPanel;
pub use confirm_dialog::ConfirmDialog;
pub use expense_panel::ExpensePanel;
pub use help_modal::HelpModal;
pub use message_modal::MessageModal;
pub use task_list::TaskList;
pub use text_input::TextInput;
