use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use super::intent::{Intent, Notification};
use super::router::{Route, View, ViewRouter};
use crate::api::{ApiClient, HttpTransport, ReqwestTransport};
use crate::models::{AuthMode, AuthState, ModalContent, Task};
use crate::session::{AuthController, SessionStore};
use crate::sync::{
    AssistantController, Confirmed, ExpenseController, ExpenseSnapshot, PendingChat, SyncError,
    Synced, TaskController, ANALYSIS_PENDING, ANALYSIS_TITLE, DELETE_PROMPT, SUGGESTION_PENDING,
    SUGGESTION_TITLE,
};

const REGISTERED: &str = "Registration successful! Please log in.";

/// Destructive action waiting for the operator's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingAction {
    DeleteTask(String),
}

struct Inner<T: HttpTransport> {
    auth: AuthController<T>,
    tasks: TaskController<T>,
    expenses: ExpenseController<T>,
    assistant: AssistantController<T>,
    router: Mutex<ViewRouter>,
    pending: Mutex<Option<PendingAction>>,
    notifications: UnboundedSender<Notification>,
}

/// Runs intents against the controllers and reports state changes.
///
/// Front-ends send [`Intent`]s and render whatever arrives on the
/// notification channel. Each intent runs on its own task.
pub struct Dispatcher<T: HttpTransport = ReqwestTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: HttpTransport> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: HttpTransport> Dispatcher<T> {
    pub fn new(api: ApiClient<T>) -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            auth: AuthController::new(api.clone()),
            tasks: TaskController::new(api.clone()),
            expenses: ExpenseController::new(api.clone()),
            assistant: AssistantController::new(api),
            router: Mutex::new(ViewRouter::new()),
            pending: Mutex::new(None),
            notifications: tx,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn session(&self) -> &SessionStore {
        self.inner.auth.session()
    }

    pub fn view(&self) -> View {
        self.router().view()
    }

    fn router(&self) -> MutexGuard<'_, ViewRouter> {
        self.inner.router.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingAction>> {
        self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, notification: Notification) {
        if self.inner.notifications.send(notification).is_err() {
            debug!("Notification dropped, no renderer attached");
        }
    }

    /// Spawns the intent and returns immediately.
    pub fn dispatch(&self, intent: Intent) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.handle(intent).await })
    }

    pub async fn handle(&self, intent: Intent) {
        debug!("Handling {:?}", intent);
        match intent {
            Intent::Restore => {
                if self.session().auth_state() == AuthState::Verifying {
                    self.sync_session();
                }
                match self.inner.auth.restore().await {
                    Ok(_) => self.after_session_change().await,
                    Err(e) => self.report(e),
                }
            }
            Intent::Login { email, password } => {
                match self.inner.auth.login(&email, &password).await {
                    Ok(user) => {
                        self.emit(Notification::Info(format!("Signed in as {}", user.email)));
                        self.after_session_change().await;
                    }
                    Err(e) => self.report(e),
                }
            }
            Intent::Register { email, password } => {
                match self.inner.auth.register(&email, &password).await {
                    Ok(mode) => {
                        self.set_mode(mode);
                        self.emit(Notification::Info(REGISTERED.to_string()));
                    }
                    Err(e) => self.report(e),
                }
            }
            Intent::SetAuthMode(mode) => self.set_mode(mode),
            Intent::Logout => {
                let result = self.inner.auth.logout().await;
                self.after_session_change().await;
                match result {
                    Ok(()) => self.emit(Notification::Info("Signed out".to_string())),
                    Err(e) => self.report(e),
                }
            }
            Intent::ShowSection(section) => {
                let view = self.router().show_section(section);
                if let Some(view) = view {
                    self.emit(Notification::View(view));
                }
            }
            Intent::RefreshAll => self.load_all().await,
            Intent::RefreshTasks => {
                let result = self.inner.tasks.list().await;
                self.publish_tasks(result);
            }
            Intent::CreateTask(title) => {
                let result = self.inner.tasks.create(&title).await;
                self.publish_tasks(result);
            }
            Intent::ToggleTask { id, completed } => {
                let result = self.inner.tasks.toggle(&id, completed).await;
                self.publish_tasks(result);
            }
            Intent::DeleteTask(id) => {
                *self.pending() = Some(PendingAction::DeleteTask(id));
                self.emit(Notification::ConfirmRequested(DELETE_PROMPT.to_string()));
            }
            Intent::ConfirmPending => {
                let action = self.pending().take();
                match action {
                    Some(PendingAction::DeleteTask(id)) => {
                        match self.inner.tasks.delete(&id, &Confirmed).await {
                            Ok(Some(synced)) => self.publish_tasks(Ok(synced)),
                            Ok(None) => {}
                            Err(e) => self.report(e),
                        }
                    }
                    None => debug!("Nothing awaiting confirmation"),
                }
            }
            Intent::CancelPending => {
                if let Some(action) = self.pending().take() {
                    debug!("Cancelled {:?}", action);
                }
            }
            Intent::RefreshExpenses => {
                let result = self.inner.expenses.refresh().await;
                self.publish_expenses(result);
            }
            Intent::CreateExpense {
                category,
                amount_text,
            } => {
                let result = self.inner.expenses.create(&category, &amount_text).await;
                self.publish_expenses(result);
            }
            Intent::Suggest => {
                self.emit(Notification::Modal(ModalContent::new(
                    SUGGESTION_TITLE,
                    SUGGESTION_PENDING,
                )));
                match self.inner.assistant.suggest().await {
                    Ok(modal) => self.emit(Notification::Modal(modal)),
                    Err(e) => self.report(e),
                }
            }
            Intent::Analyze => {
                self.emit(Notification::Modal(ModalContent::new(
                    ANALYSIS_TITLE,
                    ANALYSIS_PENDING,
                )));
                match self.inner.assistant.analyze().await {
                    Ok(modal) => self.emit(Notification::Modal(modal)),
                    Err(e) => self.report(e),
                }
            }
            Intent::SendChat(text) => match self.inner.assistant.echo(&text) {
                Ok(pending) => self.send_chat(pending).await,
                Err(e) => self.report(e),
            },
            Intent::RetryChat => match self.inner.assistant.take_failed() {
                Some(pending) => self.send_chat(pending).await,
                None => self.emit(Notification::Info("Nothing to retry".to_string())),
            },
        }
    }

    async fn send_chat(&self, pending: PendingChat) {
        self.emit(Notification::Transcript(self.inner.assistant.transcript()));
        let result = self.inner.assistant.send(pending).await;
        self.emit(Notification::Transcript(self.inner.assistant.transcript()));
        if let Err(e) = result {
            self.report(e);
        }
    }

    fn set_mode(&self, mode: AuthMode) {
        let view = self.router().set_mode(mode);
        self.emit(Notification::AuthMode(mode));
        if let Some(view) = view {
            self.emit(Notification::View(view));
        }
    }

    /// Publishes the session and moves the router; drops held data on sign-out.
    fn sync_session(&self) -> Option<Route> {
        let session = self.session().snapshot();
        self.emit(Notification::Session {
            state: session.state,
            user: session.user,
        });

        if session.state != AuthState::Authenticated {
            self.inner.tasks.clear();
            self.inner.expenses.clear();
            self.inner.assistant.clear_transcript();
            *self.pending() = None;
        }

        let route = self.router().on_session(session.state);
        if let Some(route) = route {
            self.emit(Notification::View(route.view));
        }
        route
    }

    async fn after_session_change(&self) {
        if let Some(route) = self.sync_session() {
            if route.entered_dashboard {
                self.load_all().await;
            }
        }
    }

    async fn load_all(&self) {
        let (tasks, expenses) =
            futures::join!(self.inner.tasks.list(), self.inner.expenses.refresh());
        self.publish_tasks(tasks);
        self.publish_expenses(expenses);
    }

    fn publish_tasks(&self, result: Result<Synced<Vec<Task>>, SyncError>) {
        match result {
            Ok(Synced::Applied(tasks)) => self.emit(Notification::Tasks(tasks)),
            Ok(Synced::Superseded) => {}
            Err(e) => self.report(e),
        }
    }

    fn publish_expenses(&self, result: Result<Synced<ExpenseSnapshot>, SyncError>) {
        match result {
            Ok(Synced::Applied(snapshot)) => self.emit(Notification::Expenses {
                expenses: snapshot.expenses,
                summary: snapshot.summary,
            }),
            Ok(Synced::Superseded) => {}
            Err(e) => self.report(e),
        }
    }

    /// Turns a failure into notifications.
    ///
    /// A rejected session has already been invalidated by the API client;
    /// here the router follows it back to the sign-in screen.
    fn report(&self, error: SyncError) {
        match error {
            SyncError::Busy => debug!("Ignoring request while another is in flight"),
            e if e.is_auth() => {
                let route = self.sync_session();
                self.emit(Notification::Error(e.user_message()));
                if route.is_some_and(|r| r.entered_dashboard) {
                    self.dispatch(Intent::RefreshAll);
                }
            }
            e => self.emit(Notification::Error(e.user_message())),
        }
    }
}
