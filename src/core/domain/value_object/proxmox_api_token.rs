use crate::core::domain::error::ValidationError;
use std::fmt;

/// A Proxmox API token (`TOKENID=SECRET`).
///
/// Accepts either the bare `TOKENID=SECRET` form or the full
/// `user@realm!TOKENID=SECRET` form; the user part is always taken from the
/// connection's username. `Debug` is redacted.
#[derive(Clone)]
pub struct ProxmoxApiToken {
    token_id: String,
    secret: String,
}

impl ProxmoxApiToken {
    /// Creates a new token without validation.
    ///
    /// Input that does not split into an id and a secret yields an empty id.
    pub(crate) fn new_unchecked(token: &str) -> Self {
        let bare = token.rsplit('!').next().unwrap_or(token);
        let (token_id, secret) = bare.split_once('=').unwrap_or(("", bare));
        Self {
            token_id: token_id.to_string(),
            secret: secret.to_string(),
        }
    }

    /// Returns the token id (the part before `=`).
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Formats the `Authorization` header value for `user@realm`.
    #[must_use]
    pub fn as_authorization_header(&self, qualified_user: &str) -> String {
        format!(
            "PVEAPIToken={}!{}={}",
            qualified_user, self.token_id, self.secret
        )
    }
}

impl fmt::Debug for ProxmoxApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxmoxApiToken")
            .field("token_id", &self.token_id)
            .field("secret", &"***")
            .finish()
    }
}

/// Validates an API token string.
pub(crate) fn validate_api_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "api_token".to_string(),
            message: "API token cannot be empty".to_string(),
        });
    }
    let bare = token.rsplit('!').next().unwrap_or(token);
    let Some((token_id, secret)) = bare.split_once('=') else {
        return Err(ValidationError::Format(
            "API token must be in format TOKENID=SECRET".to_string(),
        ));
    };
    if token_id.is_empty()
        || !token_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::Format(
            "API token id may only contain alphanumeric characters, -, _ and .".to_string(),
        ));
    }
    if secret.is_empty() || !secret.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::Format(
            "API token secret must be non-empty printable ASCII".to_string(),
        ));
    }
    Ok(())
}
