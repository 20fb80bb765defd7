//! Domain error types
//!
//! Two error layers live here. `DomainError` covers construction-time
//! validation of domain values. `TransferError` is the classification
//! surface shared by every remote operation: adapters map transport and
//! HTTP failures into it, and the batch layer records it per item
//! without ever tearing down the batch.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Errors raised while constructing or validating domain values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// The kind of remote operation an error was raised by
///
/// Carried in error values so that reports and logs can attribute a
/// failure without parsing message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Metadata,
    List,
    Download,
    Upload,
    Delete,
    Move,
    Share,
    FolderCreate,
    Auth,
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Metadata => "metadata",
            Self::List => "list",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Share => "share",
            Self::FolderCreate => "folder-create",
            Self::Auth => "auth",
        };
        write!(f, "{s}")
    }
}

/// Failure modes of a transfer operation
///
/// Every fallible remote interaction resolves to one of these variants.
/// `Remote` carries the HTTP status for fatal responses; retryable
/// statuses never surface directly and instead appear as the `last`
/// cause inside `RetryExhausted` once the attempt budget runs out.
#[derive(Debug, Error)]
pub enum TransferError {
    /// All retry attempts for an operation were consumed
    #[error("{op} failed after {attempts} attempt(s): {last}")]
    RetryExhausted {
        op: OperationKind,
        attempts: u32,
        last: String,
    },

    /// The service answered with a non-retryable error status
    #[error("{op} rejected by remote (HTTP {status}): {message}")]
    Remote {
        op: OperationKind,
        status: u16,
        message: String,
    },

    /// The remote response violated the expected protocol
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// The operation was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// A local filesystem operation failed
    #[error("Local I/O error: {0}")]
    LocalIo(#[from] std::io::Error),

    /// Token acquisition or refresh failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl TransferError {
    /// True if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// True if this error is an exhausted retry budget
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }

    /// The HTTP status, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_exhausted_display() {
        let err = TransferError::RetryExhausted {
            op: OperationKind::Download,
            attempts: 5,
            last: "HTTP 503".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("download"));
        assert!(msg.contains("5 attempt(s)"));
        assert!(msg.contains("HTTP 503"));
        assert!(err.is_retry_exhausted());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_remote_carries_status() {
        let err = TransferError::Remote {
            op: OperationKind::Upload,
            status: 409,
            message: "nameAlreadyExists".to_string(),
        };
        assert_eq!(err.status(), Some(409));
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn test_local_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TransferError = io.into();
        assert!(matches!(err, TransferError::LocalIo(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_cancelled_predicate() {
        assert!(TransferError::Cancelled.is_cancelled());
    }
}
