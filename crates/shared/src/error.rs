use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a call into the base API can fail.
///
/// The variants are kept apart for logging, but callers present all of them
/// through [`RequestError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

impl RequestError {
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected(message.unwrap_or_default())
    }

    /// Text shown to the user. Backend rejections are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// A message surfaced to the user in place of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

impl From<&RequestError> for Notice {
    fn from(value: &RequestError) -> Self {
        Self::new(value.user_message())
    }
}
