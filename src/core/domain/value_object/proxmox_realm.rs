use crate::core::domain::error::ValidationError;

/// Realm used when the caller does not name one.
pub const DEFAULT_REALM: &str = "pam";

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 32;

/// A validated Proxmox authentication realm (`pam`, `pve`, or a custom realm id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxRealm(String);

impl ProxmoxRealm {
    /// Creates a new realm without validation.
    pub(crate) fn new_unchecked(realm: String) -> Self {
        Self(realm)
    }

    /// Returns the realm as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProxmoxRealm {
    fn default() -> Self {
        Self(DEFAULT_REALM.to_string())
    }
}

/// Validates a realm identifier.
///
/// Proxmox realm ids start with a letter and contain lowercase letters,
/// digits, hyphens and underscores.
pub(crate) fn validate_realm(realm: &str) -> Result<(), ValidationError> {
    if realm.is_empty() {
        return Err(ValidationError::Field {
            field: "realm".to_string(),
            message: "Realm cannot be empty".to_string(),
        });
    }

    if realm.len() < MIN_LENGTH || realm.len() > MAX_LENGTH {
        return Err(ValidationError::Format(format!(
            "Realm length must be between {} and {} characters",
            MIN_LENGTH, MAX_LENGTH
        )));
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
    if !realm.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Realm contains invalid characters".to_string(),
        ));
    }

    if !realm.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(ValidationError::Format(
            "Realm must start with a letter".to_string(),
        ));
    }

    Ok(())
}
