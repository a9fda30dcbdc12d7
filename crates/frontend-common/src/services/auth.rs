//! Authentication API service

use async_trait::async_trait;
use campus_http::types::{AuthResponse, LoginRequest, SignupRequest, UserInfoResponse};
use campus_http::{CampusClient, ClientError};

/// Auth endpoints the session protocol depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Register and receive a fresh access token
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError>;

    /// Sign in and receive a fresh access token
    async fn signin(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError>;

    /// Exchange the long-lived credential for a new access token
    async fn refresh(&self) -> Result<AuthResponse, ClientError>;

    /// Invalidate the long-lived credential server-side
    async fn logout(&self) -> Result<(), ClientError>;

    /// Profile of the signed-in user
    async fn me(&self) -> Result<UserInfoResponse, ClientError>;
}

#[async_trait]
impl AuthApi for CampusClient {
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        CampusClient::signup(self, request).await
    }

    async fn signin(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        CampusClient::signin(self, request).await
    }

    async fn refresh(&self) -> Result<AuthResponse, ClientError> {
        CampusClient::refresh(self).await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        CampusClient::logout(self).await
    }

    async fn me(&self) -> Result<UserInfoResponse, ClientError> {
        CampusClient::me(self).await
    }
}
