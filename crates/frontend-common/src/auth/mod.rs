//! Authentication module

pub mod context;
pub mod guard;
pub mod navigation;

// Re-export commonly used items
pub use context::{
    RefreshOutcome, SessionContext, SessionContextBuilder, SessionError, SessionState,
};
pub use guard::{Guard, GuardView, ProtectedRouteRequest};
pub use navigation::{MemoryNavigator, Navigator, Route};
