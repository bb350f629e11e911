//! Storage infrastructure error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// Retryable infrastructure failure
    #[display("Transient store failure: {}", _0)]
    Transient(String),
    /// The store did not respond within the operation deadline
    #[display("Store operation '{}' timed out after {}ms", operation, elapsed_ms)]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Deadline that elapsed, in milliseconds
        elapsed_ms: u64,
    },
    /// Record not found in the backing store
    #[display("Record not found: {}", _0)]
    NotFound(String),
}

/// Storage error with location tracking.
///
/// Carried by every durable operation so that a slow or failing backend
/// surfaces as a typed, retryable error rather than an indefinite hang.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }

    /// Whether retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            StoreErrorKind::Transient(_) | StoreErrorKind::Timeout { .. }
        )
    }
}
