//! Request payload encodings accepted by the Proxmox VE API.

use crate::core::domain::error::{ProxmoxError, ProxmoxResult};
use serde::Serialize;
use serde_json::Value;

/// An encoded request payload.
///
/// Most Proxmox endpoints read `application/x-www-form-urlencoded` parameters,
/// a few accept JSON, and GET/DELETE take their parameters in the query string.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent as `application/json`.
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Appended to the URL query string.
    Query(Vec<(String, String)>),
}

impl Body {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> ProxmoxResult<Self> {
        serde_json::to_value(body)
            .map(Self::Json)
            .map_err(|e| ProxmoxError::Parse(format!("Failed to serialize request body: {}", e)))
    }

    pub fn form<B: Serialize + ?Sized>(body: &B) -> ProxmoxResult<Self> {
        to_pairs(body).map(Self::Form)
    }

    pub fn query<B: Serialize + ?Sized>(body: &B) -> ProxmoxResult<Self> {
        to_pairs(body).map(Self::Query)
    }
}

/// Flattens a serializable struct or map into key/value pairs.
///
/// `null` fields are dropped, booleans become `1`/`0` as Proxmox expects, and
/// arrays repeat their key once per element. Nested objects are rejected.
fn to_pairs<B: Serialize + ?Sized>(body: &B) -> ProxmoxResult<Vec<(String, String)>> {
    let value = serde_json::to_value(body)
        .map_err(|e| ProxmoxError::Parse(format!("Failed to serialize request body: {}", e)))?;

    let Value::Object(map) = value else {
        return Err(ProxmoxError::Parse(
            "Form and query bodies must serialize to an object".to_string(),
        ));
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(encoded) = scalar(&key, item)? {
                        pairs.push((key.clone(), encoded));
                    }
                }
            }
            other => {
                if let Some(encoded) = scalar(&key, other)? {
                    pairs.push((key, encoded));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar(key: &str, value: Value) -> ProxmoxResult<Option<String>> {
    Ok(match value {
        Value::Null => None,
        Value::Bool(flag) => Some(if flag { "1" } else { "0" }.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text),
        Value::Array(_) | Value::Object(_) => {
            return Err(ProxmoxError::Parse(format!(
                "Field '{}' is nested and cannot be form-encoded",
                key
            )));
        }
    })
}

/// Serializes `body` straight to an `application/x-www-form-urlencoded` string.
pub(crate) fn form_encoded<B: Serialize + ?Sized>(body: &B) -> ProxmoxResult<String> {
    to_pairs(body).map(|pairs| encode_pairs(&pairs))
}

/// Encodes pairs as `application/x-www-form-urlencoded`.
pub(crate) fn encode_pairs(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
