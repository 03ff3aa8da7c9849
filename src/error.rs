//! Error types returned by the client.

use std::fmt;
use std::time::Duration;

/// Errors that can occur while talking to the Have I Been Pwned API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The email address was rejected locally; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request URL could not be built from the base URL and resource path.
    #[error("failed to resolve request url: {0}")]
    UrlResolution(#[from] url::ParseError),

    /// Network, connection, timeout or client construction failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled the operation before the exchange completed.
    #[error("request cancelled")]
    Cancelled,

    /// A 200 response body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API answered with a non-200 status.
    #[error(transparent)]
    Remote(#[from] ApiError),
}

impl Error {
    /// Whether the failure happened before a response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Cancelled)
    }

    /// Server-provided retry hint, if this is a remote error that carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Remote(err) => err.retry_after(),
            _ => None,
        }
    }
}

/// Reasons an email address is rejected before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("email length must be from 6 to 150")]
    InvalidLength,
    #[error("email not valid")]
    MalformedAddress,
    #[error("length of local part should be max 64 characters")]
    LocalPartTooLong,
    #[error("not an email pattern (bad local part)")]
    InvalidLocalPart,
    #[error("not an email pattern (bad domain)")]
    InvalidDomain,
}

/// Normalized non-200 response.
///
/// `code` is always the HTTP status of the response, even when the body
/// carried a different `statusCode` or could not be decoded at all.
/// `retry_after` is in seconds, `0` meaning the server gave no hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    pub description: String,
    pub retry_after: u64,
}

impl ApiError {
    /// The retry hint as a duration, `None` when the server sent none.
    pub fn retry_after(&self) -> Option<Duration> {
        (self.retry_after > 0).then(|| Duration::from_secs(self.retry_after))
    }

    /// True for `429 Too Many Requests`.
    pub fn is_rate_limited(&self) -> bool {
        self.code == 429
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.code, self.description, self.message, self.retry_after
        )
    }
}

impl std::error::Error for ApiError {}
