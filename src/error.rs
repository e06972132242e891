//! Error handling for the scrobbler.
//!
//! Every failure falls into one of four categories, each surfaced to the
//! direct caller without being retried:
//!
//! * [`Transport`](Error::Transport) - the request never completed (connection
//!   refused, DNS failure, timeout)
//! * [`HttpStatus`](Error::HttpStatus) - the server answered with a status
//!   other than `200`
//! * [`Protocol`](Error::Protocol) - the body did not start with `OK` or was
//!   shorter than the command requires
//! * [`Validation`](Error::Validation) - caller data was rejected before any
//!   request was built
//!
//! # Example
//!
//! ```rust
//! use scrobbler::error::{Error, Result};
//!
//! async fn report(session: &Session, scrobble: &Scrobble) -> Result<()> {
//!     match session.submit(scrobble).await {
//!         Err(e) if e.is_bad_session() => {
//!             // re-handshake and try again
//!         }
//!         other => other,
//!     }
//! }
//! ```

use thiserror::Error;

/// Standard result type for scrobbler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reply sent by the submission servers when the session key is no longer
/// valid.
const BAD_SESSION: &str = "BADSESSION";

/// Errors returned by the scrobbler.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level failure: the request did not produce a response.
    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status code outside `{0, 200}`.
    #[error("invalid HTTP status ({0})")]
    HttpStatus(u16),

    /// The server rejected the request or sent a malformed reply.
    ///
    /// For rejections this is the server's own error text, such as `BADAUTH`
    /// or `BANNED`.
    #[error("{0}")]
    Protocol(String),

    /// The play event is not a legal submission.
    #[error("{0}")]
    Validation(String),
}

impl Error {
    /// Creates a transport error from any underlying error.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport(error.into())
    }

    /// Creates a protocol error with the given message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the server reported that the session key has expired.
    ///
    /// Callers may respond by re-running the handshake and retrying.
    #[must_use]
    pub fn is_bad_session(&self) -> bool {
        matches!(self, Self::Protocol(message) if message == BAD_SESSION)
    }
}

/// Converts HTTP client errors to `Transport`.
///
/// `reqwest` only reports statuses as errors when asked to, which the client
/// never does, so all of its errors are connection-level.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Converts URL parsing errors to `Protocol`.
///
/// URLs are only parsed from handshake replies, so a bad one means the
/// server sent something unusable.
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::Protocol(format!("invalid URL: {e}"))
    }
}
