//! Session context: refresh, sign-in, sign-out and central auth-error handling
//!
//! The context is an explicit, cloneable handle passed to whatever needs the
//! session. It owns the refresh state machine
//! (`Unknown -> Refreshing -> Authenticated | Anonymous`) and mirrors every
//! write to the credential store into that state.

use super::navigation::{Navigator, Route};
use crate::config::AuthConfig;
use crate::services::AuthApi;
use crate::services::api_wrapper::with_auth_error_handling;
use campus_core::{
    Attempt, CredentialStore, Credentials, RevalidationPolicy, Session, Subscription, Validate,
    ValidationError,
};
use campus_http::ClientError;
use campus_http::types::{AuthResponse, LoginRequest, SignupRequest, UserInfoResponse};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// State of the refresh and guard protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No attempt made yet
    Unknown,
    /// Refresh request in flight
    Refreshing,
    Authenticated(Credentials),
    Anonymous,
}

impl SessionState {
    /// Whether the outcome is known
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Anonymous)
    }
}

impl From<&Session> for SessionState {
    fn from(session: &Session) -> Self {
        match session {
            Session::Authenticated(credentials) => Self::Authenticated(credentials.clone()),
            Session::Anonymous => Self::Anonymous,
        }
    }
}

/// Result of a refresh attempt as seen by the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Pending,
    Success(Credentials),
    Failure(String),
}

/// Errors of session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Authentication response is missing identity claims")]
    MissingClaims,

    #[error("Superseded by a newer session change")]
    Superseded,
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    attempt: Attempt,
    outcome: SharedRefresh,
}

/// Pieces needed to finish a refresh after its initiator is gone
#[derive(Clone)]
struct Core {
    store: CredentialStore,
    api: Arc<dyn AuthApi>,
    state: Arc<watch::Sender<SessionState>>,
    last_failure: Arc<Mutex<Option<String>>>,
}

impl Core {
    fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    fn outcome(&self) -> RefreshOutcome {
        match self.state() {
            SessionState::Unknown | SessionState::Refreshing => RefreshOutcome::Pending,
            SessionState::Authenticated(credentials) => RefreshOutcome::Success(credentials),
            SessionState::Anonymous => RefreshOutcome::Failure(
                self.last_failure
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
                    .unwrap_or_else(|| "not signed in".to_string()),
            ),
        }
    }

    fn record_failure(&self, reason: Option<String>) {
        *self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reason;
    }

    async fn run_refresh(self, attempt: Attempt) -> RefreshOutcome {
        let result = match self.api.refresh().await {
            Ok(response) => response
                .into_credentials()
                .ok_or(SessionError::MissingClaims),
            Err(error) => Err(SessionError::Client(error)),
        };

        match result {
            Ok(credentials) => {
                if self
                    .store
                    .apply(attempt, Session::Authenticated(credentials.clone()))
                {
                    debug!(user_id = %credentials.user_id, "Session refreshed");
                    RefreshOutcome::Success(credentials)
                } else {
                    self.outcome()
                }
            }
            Err(error) => {
                let reason = error.to_string();
                if self.store.is_current(attempt) {
                    self.record_failure(Some(reason.clone()));
                }
                if self.store.apply(attempt, Session::Anonymous) {
                    warn!("Session refresh failed: {reason}");
                    RefreshOutcome::Failure(reason)
                } else {
                    self.outcome()
                }
            }
        }
    }
}

struct Inner {
    core: Core,
    navigator: Arc<dyn Navigator>,
    policy: RevalidationPolicy,
    login_route: Route,
    public_route: Route,
    in_flight: Mutex<Option<InFlight>>,
    _subscription: Subscription,
}

/// Shared handle to the session protocol
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl SessionContext {
    pub fn builder(
        store: CredentialStore,
        api: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
    ) -> SessionContextBuilder {
        SessionContextBuilder {
            store,
            api,
            navigator,
            policy: RevalidationPolicy::default(),
            login_route: Route::new(AuthConfig::LOGIN_ROUTE),
            public_route: Route::new(AuthConfig::PUBLIC_ROUTE),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.inner.core.store
    }

    /// Current session snapshot
    pub fn session(&self) -> Arc<Session> {
        self.inner.core.store.session()
    }

    pub fn state(&self) -> SessionState {
        self.inner.core.state()
    }

    /// Receiver notified on every state transition
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.core.state.subscribe()
    }

    /// Outcome derived from the current state
    pub fn outcome(&self) -> RefreshOutcome {
        self.inner.core.outcome()
    }

    pub fn policy(&self) -> RevalidationPolicy {
        self.inner.policy
    }

    pub fn login_route(&self) -> &Route {
        &self.inner.login_route
    }

    pub fn public_route(&self) -> &Route {
        &self.inner.public_route
    }

    pub fn navigate(&self, route: &Route) {
        self.inner.navigator.navigate(route);
    }

    /// Settle the session on application load.
    ///
    /// Refreshes only while the state is still unknown; joins a refresh
    /// already in flight.
    pub async fn ensure_session(&self) -> RefreshOutcome {
        match self.state() {
            SessionState::Unknown => match self.trust_local() {
                Some(outcome) => outcome,
                None => self.refresh().await,
            },
            SessionState::Refreshing => match self.join_in_flight() {
                Some(outcome) => outcome.await,
                None => RefreshOutcome::Pending,
            },
            SessionState::Authenticated(_) | SessionState::Anonymous => self.outcome(),
        }
    }

    /// Re-validate before a protected view, honouring the policy
    pub async fn revalidate(&self) -> RefreshOutcome {
        match self.trust_local() {
            Some(outcome) => outcome,
            None => self.refresh().await,
        }
    }

    /// Exchange the long-lived credential for a new session.
    ///
    /// Concurrent callers share one request. A result that arrives after a
    /// newer session change is discarded and the current outcome returned.
    pub async fn refresh(&self) -> RefreshOutcome {
        let outcome = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match in_flight.as_ref() {
                Some(current) if self.is_live(current) => {
                    debug!(
                        attempt = current.attempt.sequence(),
                        "Joining in-flight refresh"
                    );
                    current.outcome.clone()
                }
                _ => {
                    let attempt = self.inner.core.store.begin_attempt();
                    debug!(attempt = attempt.sequence(), "Starting session refresh");
                    self.inner.core.state.send_replace(SessionState::Refreshing);

                    let outcome = self
                        .inner
                        .core
                        .clone()
                        .run_refresh(attempt)
                        .boxed()
                        .shared();
                    *in_flight = Some(InFlight {
                        attempt,
                        outcome: outcome.clone(),
                    });
                    outcome
                }
            }
        };

        outcome.await
    }

    /// Sign in; the response claims become the session directly
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the server, or the
    /// failure that ended the session.
    pub async fn login(&self, request: &LoginRequest) -> Result<Credentials, SessionError> {
        request.validate()?;
        let attempt = self.inner.core.store.begin_attempt();
        info!(email = %request.email, "Signing in");
        let result = self.inner.core.api.signin(request).await;
        self.complete_sign_in(attempt, result)
    }

    /// Register; the response claims become the session directly
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the server, or the
    /// failure that ended the session.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Credentials, SessionError> {
        request.validate()?;
        let attempt = self.inner.core.store.begin_attempt();
        info!(email = %request.email, "Registering");
        let result = self.inner.core.api.signup(request).await;
        self.complete_sign_in(attempt, result)
    }

    /// Sign out. The server call is best-effort; local state is always
    /// cleared afterwards, superseding anything started meanwhile.
    pub async fn logout(&self) {
        let core = &self.inner.core;
        // Results of refreshes already in flight are discarded
        core.store.begin_attempt();
        info!("Signing out");

        if let Err(e) = core.api.logout().await {
            warn!("Logout request failed, clearing local session anyway: {e}");
        }

        core.record_failure(None);
        core.store.clear_session();
        self.navigate(&self.inner.public_route);
    }

    /// End the session if `error` is an authentication or authorization
    /// failure. Returns `true` when it did.
    pub fn handle_api_error(&self, error: &ClientError) -> bool {
        if !error.is_auth_expired() {
            return false;
        }

        warn!("Authenticated call rejected, ending session: {error}");
        self.inner.core.store.clear_session();
        self.end_session(error);
        true
    }

    /// Like [`Self::handle_api_error`] for a call sent with `sent_with`.
    ///
    /// A rejection only ends the session the call was made with; if a newer
    /// session has been installed meanwhile it is kept.
    pub fn handle_call_error(&self, error: &ClientError, sent_with: Option<&str>) -> bool {
        if !error.is_auth_expired() {
            return false;
        }

        if !self.inner.core.store.clear_if_token(sent_with) {
            debug!("Ignoring rejection of a call made with a replaced session: {error}");
            return false;
        }

        warn!("Authenticated call rejected, ending session: {error}");
        self.end_session(error);
        true
    }

    /// Profile of the signed-in user
    ///
    /// # Errors
    ///
    /// Returns the client error; auth failures also end the session.
    pub async fn profile(&self) -> Result<UserInfoResponse, ClientError> {
        with_auth_error_handling(self, self.inner.core.api.me()).await
    }

    fn end_session(&self, error: &ClientError) {
        self.inner.core.record_failure(Some(error.to_string()));
        self.navigate(&self.inner.login_route);
    }

    fn is_live(&self, in_flight: &InFlight) -> bool {
        in_flight.outcome.peek().is_none() && self.inner.core.store.is_current(in_flight.attempt)
    }

    fn join_in_flight(&self) -> Option<SharedRefresh> {
        let in_flight = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight
            .as_ref()
            .filter(|current| self.is_live(current))
            .map(|current| current.outcome.clone())
    }

    fn trust_local(&self) -> Option<RefreshOutcome> {
        if self.inner.policy != RevalidationPolicy::TrustLocal {
            return None;
        }

        let session = self.inner.core.store.session();
        let credentials = session.credentials()?.clone();
        debug!(user_id = %credentials.user_id, "Trusting locally held identity");
        self.inner
            .core
            .state
            .send_replace(SessionState::Authenticated(credentials.clone()));
        Some(RefreshOutcome::Success(credentials))
    }

    fn complete_sign_in(
        &self,
        attempt: Attempt,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<Credentials, SessionError> {
        let core = &self.inner.core;
        let credentials = result
            .map_err(SessionError::from)
            .and_then(|response| response.into_credentials().ok_or(SessionError::MissingClaims));

        match credentials {
            Ok(credentials) => {
                if core.store.apply(attempt, credentials.clone().into()) {
                    core.record_failure(None);
                    info!(user_id = %credentials.user_id, role = %credentials.role, "Signed in");
                    Ok(credentials)
                } else {
                    Err(SessionError::Superseded)
                }
            }
            Err(error) => {
                warn!("Sign-in failed: {error}");
                if core.store.is_current(attempt) {
                    core.record_failure(Some(error.to_string()));
                }
                if core.store.apply(attempt, Session::Anonymous) {
                    self.navigate(&self.inner.login_route);
                }
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.state())
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for SessionContext
pub struct SessionContextBuilder {
    store: CredentialStore,
    api: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    policy: RevalidationPolicy,
    login_route: Route,
    public_route: Route,
}

impl SessionContextBuilder {
    pub fn policy(mut self, policy: RevalidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn login_route(mut self, route: impl Into<Route>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn public_route(mut self, route: impl Into<Route>) -> Self {
        self.public_route = route.into();
        self
    }

    pub fn build(self) -> SessionContext {
        let (sender, _) = watch::channel(SessionState::Unknown);
        let state = Arc::new(sender);

        let subscription = {
            let state = Arc::clone(&state);
            self.store.subscribe(move |session| {
                state.send_replace(SessionState::from(session));
            })
        };

        SessionContext {
            inner: Arc::new(Inner {
                core: Core {
                    store: self.store,
                    api: self.api,
                    state,
                    last_failure: Arc::new(Mutex::new(None)),
                },
                navigator: self.navigator,
                policy: self.policy,
                login_route: self.login_route,
                public_route: self.public_route,
                in_flight: Mutex::new(None),
                _subscription: subscription,
            }),
        }
    }
}
