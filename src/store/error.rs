//! Store error taxonomy.

use std::error::Error;
use std::fmt;

/// Error raised by a [`RemoteStore`](super::RemoteStore) operation.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Failure classes a store client can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    NotFound,
    AlreadyExists,
    InvalidInput,
    Network,
    Timeout,
    ServiceUnavailable,
    RateLimited,
    Internal,
}

impl ErrorKind {
    /// Whether an operation failing with this kind is worth retrying.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::ServiceUnavailable | Self::RateLimited)
    }

    /// Whether this kind should abort a whole run rather than fail one
    /// item: the store will keep rejecting every other item too.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Authentication | Self::Authorization)
    }
}

impl StoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists,
            std::io::ErrorKind::PermissionDenied => ErrorKind::Authorization,
            std::io::ErrorKind::TimedOut => ErrorKind::Timeout,
            _ => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
