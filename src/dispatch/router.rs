use crate::models::{AuthMode, AuthState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Tasks,
    Expenses,
    Assistant,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Tasks, Section::Expenses, Section::Assistant];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Tasks => "Tasks",
            Section::Expenses => "Expenses",
            Section::Assistant => "AI Assistant",
        }
    }

    fn index(&self) -> usize {
        match self {
            Section::Tasks => 0,
            Section::Expenses => 1,
            Section::Assistant => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Sign-in screen. `verifying` is set while a stored token is being checked.
    Auth { mode: AuthMode, verifying: bool },
    Dashboard(Section),
}

impl View {
    pub fn is_dashboard(&self) -> bool {
        matches!(self, View::Dashboard(_))
    }
}

/// Result of feeding a session change to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub view: View,
    /// True when this change moved onto the dashboard; the caller loads data.
    pub entered_dashboard: bool,
}

/// Decides which screen is visible.
///
/// The last dashboard section and the auth form mode survive switching
/// between screens.
#[derive(Debug, Clone)]
pub struct ViewRouter {
    view: View,
    mode: AuthMode,
    section: Section,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self {
            view: View::Auth {
                mode: AuthMode::Login,
                verifying: false,
            },
            mode: AuthMode::Login,
            section: Section::Tasks,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Returns the new route when the visible view changed.
    pub fn on_session(&mut self, state: AuthState) -> Option<Route> {
        let next = match state {
            AuthState::Authenticated => View::Dashboard(self.section),
            AuthState::Verifying => View::Auth {
                mode: self.mode,
                verifying: true,
            },
            AuthState::Unauthenticated => View::Auth {
                mode: self.mode,
                verifying: false,
            },
        };
        self.route_to(next)
    }

    pub fn set_mode(&mut self, mode: AuthMode) -> Option<View> {
        self.mode = mode;
        match self.view {
            View::Auth { verifying, .. } => self
                .route_to(View::Auth { mode, verifying })
                .map(|route| route.view),
            View::Dashboard(_) => None,
        }
    }

    /// Only effective on the dashboard.
    pub fn show_section(&mut self, section: Section) -> Option<View> {
        if !self.view.is_dashboard() {
            return None;
        }
        self.section = section;
        self.route_to(View::Dashboard(section)).map(|route| route.view)
    }

    pub fn next_section(&mut self) -> Option<View> {
        self.show_section(self.section.next())
    }

    pub fn prev_section(&mut self) -> Option<View> {
        self.show_section(self.section.prev())
    }

    fn route_to(&mut self, next: View) -> Option<Route> {
        if next == self.view {
            return None;
        }
        let entered_dashboard = !self.view.is_dashboard() && next.is_dashboard();
        self.view = next;
        Some(Route {
            view: next,
            entered_dashboard,
        })
    }
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}
