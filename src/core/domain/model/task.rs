//! Domain models for asynchronous server-side tasks (UPIDs).
//!
//! Mutating operations such as VM start/stop or backups answer with a UPID
//! and keep running on the node; `/nodes/{node}/tasks/{upid}/status` reports progress.

use crate::core::domain::value_object::serde_helpers::option_system_time;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Opaque identifier of a long-running task.
///
/// Structurally `UPID:<node>:<pid>:<pstart>:<starttime>:<type>:<id>:<user>:`,
/// but the client only ever passes it back to the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(upid: impl Into<String>) -> Self {
        Self(upid.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Node the task runs on, if the UPID is well-formed.
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        let mut parts = self.0.split(':');
        match (parts.next(), parts.next()) {
            (Some("UPID"), Some(node)) if !node.is_empty() => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskHandle {
    fn from(upid: String) -> Self {
        Self(upid)
    }
}

/// Snapshot of a task as returned by `/nodes/{node}/tasks/{upid}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TaskStatus {
    pub upid: String,
    pub node: String,
    #[serde(default)]
    pub user: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    /// Resource the task acts on (e.g. a VMID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `running` or `stopped`.
    pub status: String,
    #[serde(
        rename = "starttime",
        default,
        with = "option_system_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<SystemTime>,
    #[serde(
        rename = "endtime",
        default,
        with = "option_system_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<SystemTime>,
    /// `OK` on success, an error message otherwise. Absent while running.
    #[serde(rename = "exitstatus", default, skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pstart: Option<u64>,
}

impl TaskStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    /// Stopped with an `OK` (or empty) exit status.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status == "stopped"
            && self
                .exit_status
                .as_deref()
                .is_none_or(|exit| exit.is_empty() || exit == "OK")
    }
}
