//! Domain models for cluster nodes (`/nodes` and `/nodes/{node}/status`).

use crate::core::domain::model::api_envelope::DynamicMap;
use serde::{Deserialize, Serialize};

/// A node in the Proxmox cluster, as listed by `/nodes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeListItem {
    /// The node name (e.g., "pve1").
    pub node: String,
    /// "online", "offline" or "unknown".
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_fingerprint: Option<String>,
}

impl NodeListItem {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Detailed status of one node from `/nodes/{node}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeStatus {
    /// CPU usage (0.0 to 1.0).
    pub cpu: f64,
    pub memory: MemoryInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<MemoryInfo>,
    /// Uptime in seconds.
    pub uptime: u64,
    /// IO wait (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kversion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pveversion: Option<String>,
    /// 1, 5 and 15 minute load averages, sent as strings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loadavg: Vec<String>,
    /// CPU model, sockets, cores, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpuinfo: Option<DynamicMap>,
}

/// Memory usage in bytes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl MemoryInfo {
    /// Used share of total memory (0.0 to 1.0).
    pub fn usage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64
        }
    }
}
