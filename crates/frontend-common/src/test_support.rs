//! Fakes shared by the unit tests

use crate::auth::{MemoryNavigator, SessionContext};
use crate::services::AuthApi;
use async_trait::async_trait;
use campus_core::{CredentialStore, RevalidationPolicy, Role};
use campus_http::ClientError;
use campus_http::types::{AuthResponse, LoginRequest, SignupRequest, UserInfoResponse};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

pub type Reply = Result<AuthResponse, ClientError>;

pub fn auth_response(token: &str, id: &str, role: Role) -> AuthResponse {
    AuthResponse {
        access_token: token.to_string(),
        id: Some(id.to_string()),
        role: Some(role),
    }
}

/// Auth API whose refresh replies are released by the test
#[derive(Default)]
pub struct ScriptedApi {
    refreshes: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    refresh_calls: AtomicUsize,
    logouts: Mutex<VecDeque<oneshot::Receiver<Result<(), ClientError>>>>,
    logout_calls: AtomicUsize,
    profiles: Mutex<VecDeque<oneshot::Receiver<Result<UserInfoResponse, ClientError>>>>,
    profile_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the reply of the next refresh call
    pub fn next_refresh(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.refreshes.lock().unwrap().push_back(rx);
        tx
    }

    /// Hold the next logout call until the returned sender fires
    pub fn next_logout(&self) -> oneshot::Sender<Result<(), ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.logouts.lock().unwrap().push_back(rx);
        tx
    }

    /// Yield until `count` logout calls have been issued
    pub async fn wait_for_logout_calls(&self, count: usize) {
        while self.logout_calls.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    /// Queue the reply of the next profile call
    pub fn next_profile(&self) -> oneshot::Sender<Result<UserInfoResponse, ClientError>> {
        let (tx, rx) = oneshot::channel();
        self.profiles.lock().unwrap().push_back(rx);
        tx
    }

    /// Yield until `count` profile calls have been issued
    pub async fn wait_for_profile_calls(&self, count: usize) {
        while self.profile_calls.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Yield until `count` refresh calls have been issued
    pub async fn wait_for_refresh_calls(&self, count: usize) {
        while self.refresh_calls() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl AuthApi for ScriptedApi {
    async fn signup(&self, _request: &SignupRequest) -> Reply {
        Err(ClientError::Configuration("signup not scripted".into()))
    }

    async fn signin(&self, _request: &LoginRequest) -> Reply {
        Err(ClientError::Configuration("signin not scripted".into()))
    }

    async fn refresh(&self) -> Reply {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.refreshes.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Configuration("reply dropped".into()))),
            None => Err(ClientError::Configuration("refresh not scripted".into())),
        }
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.logouts.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx.await.unwrap_or(Ok(())),
            None => Ok(()),
        }
    }

    async fn me(&self) -> Result<UserInfoResponse, ClientError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.profiles.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Configuration("reply dropped".into()))),
            None => Err(ClientError::Configuration("me not scripted".into())),
        }
    }
}

pub fn context_with(
    store: CredentialStore,
    api: Arc<dyn AuthApi>,
    policy: RevalidationPolicy,
) -> (SessionContext, Arc<MemoryNavigator>) {
    let navigator = Arc::new(MemoryNavigator::new());
    let context = SessionContext::builder(store, api, navigator.clone())
        .policy(policy)
        .build();
    (context, navigator)
}
