//! Campus HTTP client
//!
//! Typed access to the campus REST API with bearer decoration driven by the
//! shared credential store.

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::{Auth, CampusClient, CampusClientBuilder};
