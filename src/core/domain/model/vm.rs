//! Domain models for QEMU virtual machine operations.
//!
//! This module defines the structures used when interacting with VMs via the Proxmox API.

use crate::core::domain::{
    error::ValidationError, model::api_envelope::DynamicMap,
    value_object::serde_helpers::int_bool,
};
use serde::{Deserialize, Serialize, Serializer};

/// Lowest VMID Proxmox VE accepts for guests.
pub const MIN_VMID: u32 = 100;
/// Highest VMID Proxmox VE accepts for guests.
pub const MAX_VMID: u32 = 999_999_999;

/// Checks a guest id against the range the server accepts.
pub(crate) fn validate_vmid(vmid: u32) -> Result<(), ValidationError> {
    if !(MIN_VMID..=MAX_VMID).contains(&vmid) {
        return Err(ValidationError::Field {
            field: "vmid".to_string(),
            message: format!("VMID must be between {} and {}", MIN_VMID, MAX_VMID),
        });
    }
    Ok(())
}

/// A virtual machine as returned by the `/nodes/{node}/qemu` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VmListItem {
    /// The VM identifier (unique per cluster).
    pub vmid: u32,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Current status (e.g., "running", "stopped").
    pub status: String,
    /// CPU usage (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of virtual CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u32>,
    /// Memory usage in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Maximum memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Maximum disk space in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Uptime in seconds (if running).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Whether this VM is a template.
    #[serde(default, with = "int_bool")]
    pub template: bool,
    /// Semicolon separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// VM configuration from `/nodes/{node}/qemu/{vmid}/config`.
///
/// Numbered device keys (`net0`, `scsi0`, `ide2`, ...) land in `devices`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Memory in MiB. Proxmox sends this as a string on some versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sockets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Configuration digest, needed for conflict-checked updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(flatten)]
    pub devices: DynamicMap,
}

/// Parameters for creating a new VM (`POST /nodes/{node}/qemu`).
///
/// Absent fields are omitted from the request so the server applies its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateVmParams {
    /// VM identifier (required, must be unique in the cluster).
    pub vmid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Memory in MiB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    /// CPU type (e.g. "host", "kvm64").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// OS type (e.g. "l26", "win11").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ostype: Option<String>,
    /// First network device (e.g. "virtio,bridge=vmbr0").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net0: Option<String>,
    /// First SCSI disk (e.g. "local-lvm:32").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scsi0: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scsihw: Option<String>,
    /// Start after creation (0/1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of a VM configuration (`PUT /nodes/{node}/qemu/{vmid}/config`).
///
/// Every setting has three states: untouched (`None`), set (`Some`), or
/// removed (listed in `delete`). Setting a value to an empty string is not the
/// same as removing it, which is why removal goes through [`VmConfigUpdate::unset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VmConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Reject the update if the config changed since this digest was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_comma_list"
    )]
    pub delete: Vec<String>,
}

impl VmConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn memory(mut self, mebibytes: u32) -> Self {
        self.memory = Some(mebibytes);
        self
    }

    pub fn cores(mut self, cores: u32) -> Self {
        self.cores = Some(cores);
        self
    }

    pub fn sockets(mut self, sockets: u32) -> Self {
        self.sockets = Some(sockets);
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Removes a setting from the configuration.
    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.delete.push(key.into());
        self
    }

    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn serialize_comma_list<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&values.join(","))
}
