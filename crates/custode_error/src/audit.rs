//! Audit log error types.

/// Kinds of audit errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuditErrorKind {
    /// A stored record's signature no longer matches its fields
    #[display("Integrity mismatch for event '{}': stored {} != computed {}", event_id, stored, computed)]
    IntegrityMismatch {
        /// Identifier of the corrupted event
        event_id: String,
        /// Signature found on the record
        stored: String,
        /// Signature recomputed from the record's fields
        computed: String,
    },
    /// Event not found in the requested range
    #[display("Event '{}' not found", event_id)]
    EventNotFound {
        /// Identifier that was looked up
        event_id: String,
    },
    /// Event could not be serialized for signing
    #[display("Failed to canonicalize event details: {}", _0)]
    Canonicalization(String),
    /// The requested reporting period is empty or inverted
    #[display("Invalid reporting period: {}", _0)]
    InvalidPeriod(String),
    /// A configured threat pattern is not a valid regex
    #[display("Invalid threat pattern '{}': {}", pattern, reason)]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why compilation failed
        reason: String,
    },
}

/// Audit error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Audit Error: {} at line {} in {}", kind, line, file)]
pub struct AuditError {
    /// The kind of error that occurred
    pub kind: AuditErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AuditError {
    /// Create a new audit error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuditErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AuditErrorKind {
        &self.kind
    }
}
