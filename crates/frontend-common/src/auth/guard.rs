//! Route guard for views that need a session

use super::context::{SessionContext, SessionState};
use super::navigation::Route;
use campus_core::{Credentials, Role};
use tracing::debug;

/// A navigation to a view that renders only for an authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRouteRequest {
    target: Route,
    required_role: Option<Role>,
}

impl ProtectedRouteRequest {
    pub fn new(target: impl Into<Route>) -> Self {
        Self {
            target: target.into(),
            required_role: None,
        }
    }

    /// Back-office view: requires the admin role
    pub fn admin(target: impl Into<Route>) -> Self {
        Self::new(target).with_role(Role::Admin)
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    pub fn target(&self) -> &Route {
        &self.target
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    fn permits(&self, credentials: &Credentials) -> bool {
        match self.required_role {
            None => true,
            Some(required) => credentials.role == Role::Admin || credentials.role == required,
        }
    }
}

/// What the host should show for a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView {
    /// Outcome not known yet; show neither content nor redirect
    Loading,
    /// Render the protected view
    Render {
        route: Route,
        credentials: Credentials,
    },
    /// No session; go to the login route
    Redirect(Route),
    /// Session lacks the required role; go to the public route
    Forbidden(Route),
}

/// Guard evaluated on every render of a protected subtree
#[derive(Debug, Clone)]
pub struct Guard {
    session: SessionContext,
}

impl Guard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// View for the current state. Never touches the network.
    pub fn evaluate(&self, request: &ProtectedRouteRequest) -> GuardView {
        match self.session.state() {
            SessionState::Unknown | SessionState::Refreshing => GuardView::Loading,
            SessionState::Anonymous => GuardView::Redirect(self.session.login_route().clone()),
            SessionState::Authenticated(credentials) if request.permits(&credentials) => {
                GuardView::Render {
                    route: request.target().clone(),
                    credentials,
                }
            }
            SessionState::Authenticated(_) => {
                GuardView::Forbidden(self.session.public_route().clone())
            }
        }
    }

    /// Navigate to a protected view.
    ///
    /// Re-validates the session per the configured policy, then evaluates.
    /// Redirects are issued through the navigator; the requested destination
    /// is not remembered.
    pub async fn enter(&self, request: &ProtectedRouteRequest) -> GuardView {
        debug!(route = %request.target(), "Entering protected route");
        self.session.revalidate().await;

        let view = self.evaluate(request);
        match &view {
            GuardView::Redirect(route) | GuardView::Forbidden(route) => {
                debug!(route = %route, "Guard redirecting");
                self.session.navigate(route);
            }
            GuardView::Loading | GuardView::Render { .. } => {}
        }
        view
    }
}
