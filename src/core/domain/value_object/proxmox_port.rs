use crate::core::domain::error::ValidationError;
use std::fmt;
use std::num::NonZeroU16;

/// Port `pveproxy` serves the API on.
pub const DEFAULT_PORT: u16 = 8006;

/// TCP port of the API endpoint. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxmoxPort(NonZeroU16);

impl ProxmoxPort {
    /// Wraps a port without validation; `0` falls back to [`DEFAULT_PORT`].
    pub(crate) fn new_unchecked(port: u16) -> Self {
        NonZeroU16::new(port).map(Self).unwrap_or_default()
    }

    pub fn get(&self) -> u16 {
        self.0.get()
    }
}

impl Default for ProxmoxPort {
    fn default() -> Self {
        Self(NonZeroU16::MIN.saturating_add(DEFAULT_PORT - 1))
    }
}

impl fmt::Display for ProxmoxPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "port".to_string(),
            message: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}
