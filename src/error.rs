//! Error types for queue operations.
//!
//! Every fallible queue operation returns [`Result`]. The nullable boundary in
//! [`crate::ops`] collapses these into the plain `bool`/`usize` outcomes the
//! command harness observes.

use std::fmt;

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What an allocation was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocKind {
    /// The queue container itself.
    Queue,
    /// A list node.
    Node,
    /// The owned copy of an inserted string.
    Value,
}

impl fmt::Display for AllocKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue => f.write_str("queue"),
            Self::Node => f.write_str("node"),
            Self::Value => f.write_str("value"),
        }
    }
}

/// Queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Memory for a queue, node or value copy could not be obtained.
    ///
    /// The queue is left exactly as it was before the call.
    #[error("allocation failed for {what} ({bytes} bytes)")]
    AllocationFailure { what: AllocKind, bytes: usize },

    /// Removal attempted on a queue with no elements.
    #[error("queue is empty")]
    EmptyQueue,

    /// Operation attempted without a queue.
    #[error("no queue")]
    NoQueue,
}

impl Error {
    /// Create an allocation failure error.
    pub fn allocation(what: AllocKind, bytes: usize) -> Self {
        Self::AllocationFailure { what, bytes }
    }

    /// Whether this error came from a refused allocation.
    #[must_use]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::allocation(AllocKind::Value, 6);
        assert_eq!(err.to_string(), "allocation failed for value (6 bytes)");
        assert!(err.is_allocation_failure());

        assert_eq!(Error::EmptyQueue.to_string(), "queue is empty");
        assert!(!Error::NoQueue.is_allocation_failure());
    }
}
