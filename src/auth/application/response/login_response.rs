use serde::Deserialize;

/// Payload of a successful `POST /access/ticket`, inside the usual envelope.
#[derive(Debug, Deserialize)]
pub struct LoginResponseData {
    pub ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    pub csrf_token: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Capability map; kept raw since callers rarely need it.
    #[serde(default)]
    pub cap: Option<serde_json::Value>,
}
