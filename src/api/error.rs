use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One validation error reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message.
    #[serde(default)]
    pub detail: String,
    /// Name of the form field the error refers to.
    #[serde(default)]
    pub path: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            path: path.into(),
        }
    }
}

/// Error body of a rejected API request: `{"errors": [{"detail": .., "path": ..}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl ErrorResponse {
    #[must_use]
    pub const fn new(errors: Vec<ErrorDetail>) -> Self {
        Self { errors }
    }

    /// Read an error body of unknown shape.
    ///
    /// Returns `None` for null or for bodies that do not look like an error
    /// list. A body without an `errors` key yields an empty list.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&ErrorDetail> {
        self.errors.first()
    }
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The API answered with an error status and body.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, body: Value },
    /// The request never got an answer.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// The structured error list carried by a rejection, if any.
    #[must_use]
    pub fn error_response(&self) -> Option<ErrorResponse> {
        match self {
            Self::Rejected { body, .. } => ErrorResponse::from_value(body),
            Self::Transport(_) => None,
        }
    }

    /// The API no longer accepts the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}
