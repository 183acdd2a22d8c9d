use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

/// Destinations the workflow can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

/// Router collaborator.
pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
}

/// A navigator that records pushed routes instead of acting on them.
///
/// The HTTP layer turns the last recorded route into a redirect hint.
#[derive(Debug, Default)]
pub struct NavigationLog {
    pushed: Mutex<Vec<Route>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Route> {
        self.pushed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    pub fn history(&self) -> Vec<Route> {
        self.pushed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for NavigationLog {
    fn push(&self, route: Route) {
        tracing::debug!(route = %route, "Navigating");
        self.pushed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
    }
}
