use thiserror::Error;

/// Errors surfaced by the hosted-backend client.
///
/// Nothing here is retried; every failure degrades to an inline message
/// while the caller stays interactive. The Display strings are the
/// user-facing copy, which is why `Unreachable` stays distinct from a
/// generic rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    #[error("cannot connect to the learning service, check your connection")]
    Unreachable,

    #[error("the learning service rejected the request: {0}")]
    Rejected(String),

    #[error("not found")]
    NotFound,

    #[error("unexpected response from the learning service: {0}")]
    Payload(String),

    #[error("backend configuration error: {0}")]
    Config(String),
}
