use crate::core::domain::{
    error::ValidationError,
    value_object::{ProxmoxHost, ProxmoxPort},
};

/// Path prefix of the JSON flavour of the Proxmox VE API.
pub const API_PREFIX: &str = "api2/json";

const MAX_LENGTH: usize = 2083;

/// A validated Proxmox server root URL, e.g. `https://pve.example.com:8006/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl(String);

impl ProxmoxUrl {
    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    /// Builds the root URL from its parts.
    pub(crate) fn from_parts(host: &ProxmoxHost, port: ProxmoxPort, secure: bool) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, host.as_authority(), port.get())
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the full API URL for a relative path.
    ///
    /// A leading `/` on `path` is optional.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.0.trim_end_matches('/'),
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }
}

/// Validates a server root URL: http(s) scheme, a host, and no path.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if url.len() > MAX_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_LENGTH
        )));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::Format("URL has no host".to_string()));
    }

    if parsed.path() != "/" {
        return Err(ValidationError::ConstraintViolation(
            "Server URL must not carry a path".to_string(),
        ));
    }

    Ok(())
}
