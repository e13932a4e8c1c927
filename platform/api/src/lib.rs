//! REST plumbing shared by suite products: a small JSON client, the error
//! taxonomy it reports, and a result wrapper that tells confirmed data apart
//! from locally substituted data.

mod client;

use std::sync::Arc;

use thiserror::Error;

pub use client::{ClientSettings, RestClient};

/// Shared client result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(Arc<anyhow::Error>),
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
    #[error("malformed payload: {0}")]
    Shape(String),
    #[error("remote reported failure")]
    Rejected,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::Status { .. } => "HTTP_STATUS",
            ApiError::Shape(_) => "SHAPE",
            ApiError::Rejected => "REJECTED",
        }
    }

    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(Arc::new(err.into()))
    }

    pub fn shape(detail: impl Into<String>) -> Self {
        Self::Shape(detail.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
            },
            None => Self::transport(value),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::shape(value.to_string())
    }
}

/// Outcome of an operation that never fails from the caller's point of view.
///
/// `Degraded` carries the substitute value (fallback or optimistic local data)
/// together with the error that forced the substitution.
#[derive(Debug, Clone)]
pub enum Synced<T> {
    Confirmed(T),
    Degraded { value: T, cause: ApiError },
}

impl<T> Synced<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Synced::Degraded { .. })
    }

    pub fn cause(&self) -> Option<&ApiError> {
        match self {
            Synced::Confirmed(_) => None,
            Synced::Degraded { cause, .. } => Some(cause),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Synced::Confirmed(value) | Synced::Degraded { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Synced::Confirmed(value) | Synced::Degraded { value, .. } => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Synced<U> {
        match self {
            Synced::Confirmed(value) => Synced::Confirmed(f(value)),
            Synced::Degraded { value, cause } => Synced::Degraded {
                value: f(value),
                cause,
            },
        }
    }
}
