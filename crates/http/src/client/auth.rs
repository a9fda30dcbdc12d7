//! Authentication API client methods

use super::{Auth, CampusClient, ClientError};
use crate::types::{AuthResponse, LoginRequest, SignupRequest, UserInfoResponse};
use reqwest::Method;

impl CampusClient {
    /// Register a new account
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/signup").json(request);
        self.execute(req, Auth::None).await
    }

    /// Sign in with email and password
    pub async fn signin(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/signin").json(request);
        self.execute(req, Auth::None).await
    }

    /// Exchange the long-lived cookie credential for a new access token
    pub async fn refresh(&self) -> Result<AuthResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/refresh");
        self.execute(req, Auth::None).await
    }

    /// Ask the server to invalidate the long-lived credential
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/auth/logout");
        self.execute_unit(req, Auth::Bearer).await
    }

    /// Profile of the signed-in user
    pub async fn me(&self) -> Result<UserInfoResponse, ClientError> {
        let req = self.request(Method::GET, "/users/me");
        self.execute(req, Auth::Bearer).await
    }
}
