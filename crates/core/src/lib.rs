//! Campus core: session model, credential store and shared configuration

pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;
pub mod tracing;
pub mod validation;

pub use crate::config::{ClientConfig, RevalidationPolicy};
pub use error::{CoreError, CoreResult};
pub use session::{Credentials, Role, Session};
pub use storage::{ACCESS_TOKEN_KEY, FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{Attempt, CredentialStore, Subscription};
pub use validation::{Validate, ValidationError};
