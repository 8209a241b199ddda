use crate::core::domain::{error::ValidationError, value_object::ProxmoxRealm};

/// A validated Proxmox username, with or without a `@realm` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUsername(String);

impl ProxmoxUsername {
    /// Creates a new username without validation.
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `user@realm`, appending the realm only when the username
    /// does not already carry one.
    #[must_use]
    pub fn qualified(&self, realm: &ProxmoxRealm) -> String {
        if self.0.contains('@') {
            self.0.clone()
        } else {
            format!("{}@{}", self.0, realm.as_str())
        }
    }
}

/// Validates a username according to the configuration.
pub(crate) fn validate_username(
    username: &str,
    block_reserved: bool,
) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Field {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.len() < 3 || username.len() > 64 {
        return Err(ValidationError::Format(format!(
            "Username length must be between 3 and 64 characters (got {})",
            username.len()
        )));
    }
    let allowed =
        |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '@';
    if !username.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Username contains invalid characters. Allowed: alphanumeric, -, _, ., @".to_string(),
        ));
    }
    if username.matches('@').count() > 1 {
        return Err(ValidationError::Format(
            "Username can contain at most one '@realm' suffix".to_string(),
        ));
    }
    if block_reserved {
        let reserved = [
            "root",
            "admin",
            "administrator",
            "nobody",
            "guest",
            "www-data",
        ];
        let bare = username.split('@').next().unwrap_or(username);
        if reserved.contains(&bare) {
            return Err(ValidationError::ConstraintViolation(
                "Username is reserved".to_string(),
            ));
        }
    }
    Ok(())
}
