//! Forum API surface consumed by the dialogs.
//!
//! The transport is abstracted behind [`ForumClient`]; [`InMemoryForum`]
//! implements it for the demo binary and tests.

mod error;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{ApiError, ErrorDetail, ErrorResponse};
pub use memory::InMemoryForum;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username or email address.
    pub identification: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: u64,
    pub username: String,
    pub token: String,
}

#[async_trait]
pub trait ForumClient: Send + Sync {
    async fn log_in(&self, credentials: Credentials) -> Result<Session, ApiError>;

    async fn sign_up(&self, registration: Registration) -> Result<Session, ApiError>;

    async fn log_out(&self, session: &Session) -> Result<(), ApiError>;
}
