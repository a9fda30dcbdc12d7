//! Session model shared by the client, the store and the guard

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role claimed by the authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access token together with the identity claims it was issued for
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub user_id: String,
    pub role: Role,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>, role: Role) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
            role,
        }
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .finish()
    }
}

/// The client's current belief about who is signed in.
///
/// A session is either fully authenticated or fully anonymous; there is no
/// way to hold a token without its claims or the other way round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Credentials),
}

impl Session {
    pub fn authenticated(
        access_token: impl Into<String>,
        user_id: impl Into<String>,
        role: Role,
    ) -> Self {
        Self::Authenticated(Credentials::new(access_token, user_id, role))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Authenticated(credentials) => Some(credentials),
            Self::Anonymous => None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credentials().map(|c| c.access_token.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.credentials().map(|c| c.user_id.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.credentials().map(|c| c.role)
    }
}

impl From<Credentials> for Session {
    fn from(credentials: Credentials) -> Self {
        Self::Authenticated(credentials)
    }
}
