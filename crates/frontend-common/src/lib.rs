//! Client-side session lifecycle for campus front-ends
//!
//! Wires the credential store, the authenticated request pipeline and the
//! refresh/guard protocol together behind an injectable [`SessionContext`].

pub mod auth;
pub mod client;
pub mod config;
pub mod services;

pub use auth::{
    Guard, GuardView, MemoryNavigator, Navigator, ProtectedRouteRequest, RefreshOutcome, Route,
    SessionContext, SessionError, SessionState,
};
pub use client::{create_client, create_session_context, create_store};
pub use config::AuthConfig;
pub use services::{AuthApi, with_auth_error_handling};

#[cfg(test)]
mod test_support;
