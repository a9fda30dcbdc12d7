//! Navigation seam between the session protocol and the host router

use std::fmt;
use std::sync::Mutex;

/// Path of a view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route(String);

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Route {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Router able to switch the active view
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Navigator that records history instead of driving a real router
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent navigation target
    pub fn current(&self) -> Option<Route> {
        self.history.lock().ok()?.last().cloned()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, route: &Route) {
        tracing::debug!(route = %route, "Navigating");
        if let Ok(mut history) = self.history.lock() {
            history.push(route.clone());
        }
    }
}
