use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Name of the header Proxmox expects the CSRF token in.
pub const CSRF_HEADER: &str = "CSRFPreventionToken";

/// A Proxmox CSRF protection token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxmoxCSRFToken(String);

impl ProxmoxCSRFToken {
    /// Creates a new CSRF token without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates that a CSRF token can be carried in a header.
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "csrf_token".to_string(),
            message: "CSRF token cannot be empty".to_string(),
        });
    }
    if !token.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::Format(
            "CSRF token must consist of printable ASCII characters".to_string(),
        ));
    }
    Ok(())
}
