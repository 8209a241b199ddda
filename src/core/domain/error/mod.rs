use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// The main error type for Proxmox VE operations.
///
/// Every failure a caller can observe maps to exactly one variant, so callers
/// can branch on "need new credentials" (`Authentication`), "server said no"
/// (`Api`, `Envelope`), "took too long" (`Timeout`) or "bad input" (`Validation`).
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// The transport failed before a complete response was received
    ///
    /// # Fields
    /// * `message` - What the client was doing when the transport failed
    /// * `source` - The underlying transport error
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server rejected the supplied credentials
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The server answered with a status outside 200-299
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by the server
    /// * `body` - The raw response body, verbatim
    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    /// The server answered 2xx but the response envelope carries errors
    #[error("API rejected request: {0:?}")]
    Envelope(BTreeMap<String, String>),

    /// The response body could not be decoded into the requested type
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A task did not reach a terminal state in time
    ///
    /// # Fields
    /// * `upid` - The task identifier that was being waited on
    /// * `elapsed` - How long the caller waited before giving up
    #[error("Timed out after {elapsed:?} waiting for task {upid}")]
    Timeout { upid: String, elapsed: Duration },

    /// The operation was cancelled through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Local file I/O failed (session persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },
}

impl ProxmoxError {
    /// Wraps a transport failure, keeping the `reqwest` error as the source.
    pub(crate) fn connection(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Connection {
            message: message.into(),
            source,
        }
    }

    /// Returns the HTTP status code attached to an `Api` error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the caller should obtain new credentials.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication(_))
            || matches!(self.status(), Some(StatusCode::UNAUTHORIZED))
    }

    /// Returns `true` for `404 Not Found` API errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(StatusCode::NOT_FOUND))
    }

    /// Returns `true` if the error came from a fired cancellation token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` for a task wait that ran out of time or a request the
    /// transport gave up on after its per-request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Connection { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

impl From<ValidationError> for ProxmoxError {
    fn from(error: ValidationError) -> Self {
        ProxmoxError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Checks that a required caller argument is neither empty nor whitespace.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("{} cannot be empty", field),
        });
    }
    Ok(())
}

/// Checks that a caller argument can be used as a single URL path segment.
pub(crate) fn require_path_segment(field: &str, value: &str) -> Result<(), ValidationError> {
    require_non_blank(field, value)?;
    if value.contains(['/', '?', '#']) {
        return Err(ValidationError::Format(format!(
            "{} cannot contain '/', '?' or '#'",
            field
        )));
    }
    Ok(())
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
