//! Console-wide error taxonomy.
//!
//! Failures fall into four families the UI treats differently: transport
//! errors, backend-reported failures (`success: false`), local validation
//! errors caught before any network call, and optional backend features that
//! are simply absent. All of them are terminal to the triggering operation;
//! nothing in this crate retries.

use thiserror::Error;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Network or protocol failure while talking to the gateway backend.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with `success: false` and a message.
    #[error("{message}")]
    Api { message: String },

    /// Local validation failed before any request was sent.
    #[error("configuration error: {0}")]
    Config(String),

    /// The backend returned 401. The local session marker has already been
    /// cleared; `return_to` is the request path to resume after re-login.
    #[error("session expired")]
    SessionExpired { return_to: String },

    /// An optional backend subsystem (e.g. subscription plans) is not
    /// deployed. Informational, not a user-facing error.
    #[error("{0} is not available on this backend")]
    FeatureUnavailable(&'static str),

    /// A response body did not match the expected wire shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ConsoleError {
    /// Whether the failure is a degraded-but-expected state rather than
    /// something to surface as an error notification.
    pub fn is_informational(&self) -> bool {
        matches!(self, ConsoleError::FeatureUnavailable(_))
    }
}
