//! Error types shared across the crate.
//!
//! Domain failures are typed: [`ValidationError`] blocks a submission before
//! any request is made, [`TransportError`] reports a failed round-trip to the
//! backend. Startup and terminal plumbing use [`anyhow`] via [`Result`].

use thiserror::Error;

/// Crate-wide result for application plumbing (terminal, config, startup).
pub type Result<T> = anyhow::Result<T>;

/// A required form field was empty after trimming whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} cannot be empty!")]
pub struct ValidationError {
    /// Human-readable label of the offending field.
    pub field: &'static str,
}

impl ValidationError {
    pub fn empty(field: &'static str) -> Self {
        Self { field }
    }
}

/// A request to the backend failed.
///
/// The status code is carried for display only; callers treat every variant
/// the same way and never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (connect, TLS, IO).
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status.
    #[error("status {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },
    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::status(404, format!("{what} not found"))
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}
