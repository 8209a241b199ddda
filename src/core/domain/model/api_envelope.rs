//! The `{ data, errors }` wrapper most Proxmox VE endpoints answer with.

use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An untyped JSON object whose keys keep the order the server sent them in.
///
/// Used for free-form payloads such as `/version` or raw configuration maps.
pub type DynamicMap = serde_json::Map<String, serde_json::Value>;

/// Generic response envelope.
///
/// A 2xx response is only a success when `errors` is absent or empty;
/// parameter verification failures come back as a non-empty `errors` map.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl<T> ApiEnvelope<T> {
    /// True iff `errors` is absent or empty.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.as_ref().is_none_or(BTreeMap::is_empty)
    }

    /// Unwraps `data`, turning envelope errors into [`ProxmoxError::Envelope`].
    pub fn into_data(self) -> ProxmoxResult<T> {
        match self.errors {
            Some(errors) if !errors.is_empty() => Err(ProxmoxError::Envelope(errors)),
            _ => Ok(self.data),
        }
    }
}
