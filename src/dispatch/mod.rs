mod dispatcher;
mod intent;
mod router;

pub use dispatcher::Dispatcher;
pub use intent::{Intent, Notification};
pub use router::{Section, View};
