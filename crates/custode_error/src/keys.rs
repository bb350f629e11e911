//! API key, rate-limit, and token error types.

/// Kinds of key and token errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum KeyErrorKind {
    /// The secret or token does not resolve to a usable credential
    #[display("Invalid credential: {}", _0)]
    Invalid(String),
    /// The credential exists but its lifetime has elapsed
    #[display("Credential expired: {}", _0)]
    Expired(String),
    /// Too many requests within the rule's window
    #[display("Rate limited on '{}' rule: retry after {}ms", rule, retry_after_ms)]
    RateLimited {
        /// Rule that rejected the request
        rule: String,
        /// Milliseconds until the oldest logged request ages out
        retry_after_ms: u64,
    },
    /// API key not found
    #[display("API key '{}' not found", key_id)]
    KeyNotFound {
        /// Key identifier that was looked up
        key_id: String,
    },
    /// Token signing or decoding failure
    #[display("Token error: {}", _0)]
    Token(String),
}

/// Key error with location tracking.
///
/// # Examples
///
/// ```
/// use custode_error::{KeyError, KeyErrorKind};
///
/// let err = KeyError::new(KeyErrorKind::Expired("key abc".to_string()));
/// assert!(format!("{}", err).contains("expired"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Key Error: {} at line {} in {}", kind, line, file)]
pub struct KeyError {
    /// The kind of error that occurred
    pub kind: KeyErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl KeyError {
    /// Create a new key error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: KeyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KeyErrorKind {
        &self.kind
    }
}
