//! Error types for the VPN sample.
//!
//! [`Error`] is the fatal tier: anything that aborts provisioning.
//! Cleanup problems are advisory and live in [`crate::sample::Cleanup`].

use thiserror::Error;

/// Fatal error raised while configuring, authenticating or provisioning.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required environment variable is not set.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    /// Local settings are invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A generated or supplied resource name breaks ARM naming rules.
    #[error("invalid resource name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Token acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// ARM rejected a request.
    #[error("azure api error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation finished in a non-success state.
    #[error("operation on {resource} ended with status {status}: {message}")]
    OperationFailed {
        resource: String,
        status: String,
        message: String,
    },

    /// Transport level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("error parsing response from {url}: path={path} error={message}")]
    Parse {
        url: String,
        path: String,
        message: String,
    },

    /// A dependent resource reference could not be resolved.
    #[error("missing reference: {0}")]
    MissingReference(String),
}

impl Error {
    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-reference error with the given message
    pub fn missing_reference(msg: impl Into<String>) -> Self {
        Self::MissingReference(msg.into())
    }
}

/// Crate result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
