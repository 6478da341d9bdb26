/// Prompt shown before a task is deleted.
pub const DELETE_PROMPT: &str = "Are you sure?";

/// Asks the operator before a destructive call is issued.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation already given elsewhere, e.g. a `--yes` flag or an accepted dialog.
pub struct Confirmed;

impl Confirm for Confirmed {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[cfg(test)]
pub(crate) struct Declined;

#[cfg(test)]
impl Confirm for Declined {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
