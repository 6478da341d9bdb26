mod assistant;
mod confirm;
mod error;
mod expenses;
mod generation;
mod tasks;

pub use assistant::{
    AssistantController, PendingChat, ANALYSIS_PENDING, ANALYSIS_TITLE, SUGGESTION_PENDING,
    SUGGESTION_TITLE,
};
pub use confirm::{Confirm, Confirmed, DELETE_PROMPT};
#[cfg(test)]
pub(crate) use confirm::Declined;
pub use error::SyncError;
pub use expenses::{ExpenseController, ExpenseSnapshot};
pub use generation::Synced;
pub use tasks::TaskController;
