mod auth;
mod core;
mod task;

#[cfg(test)]
mod tests;

pub use crate::core::domain::error::{ProxmoxError, ProxmoxResult, ValidationError};
pub use crate::core::domain::model::{
    api_envelope::{ApiEnvelope, DynamicMap},
    client_config::{ClientConfig, DEFAULT_POLL_INTERVAL, RateLimitConfig},
    node::{MemoryInfo, NodeListItem, NodeStatus},
    proxmox_auth::{ProxmoxAuth, TICKET_LIFETIME},
    proxmox_connection::{Credential, DEFAULT_TIMEOUT, ProxmoxConnection},
    task::{TaskHandle, TaskStatus},
    vm::{CreateVmParams, VmConfig, VmConfigUpdate, VmListItem},
};
pub use crate::core::domain::value_object::{
    ProxmoxApiToken, ProxmoxCSRFToken, ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm,
    ProxmoxTicket, ProxmoxUrl, ProxmoxUsername,
};
pub use crate::core::infrastructure::{api_client::ApiClient, request_body::Body};
pub use crate::task::application::service::wait_task_service::{
    DEFAULT_TASK_TIMEOUT, TaskStatusSource, WaitTaskService,
};
pub use tokio_util::sync::CancellationToken;
pub use zxcvbn::Score as PasswordScore;

use crate::core::domain::{
    error::require_path_segment,
    model::vm::validate_vmid,
    value_object::{
        DEFAULT_PORT, DEFAULT_REALM, validate_api_token, validate_csrf_token, validate_host,
        validate_password, validate_port, validate_realm, validate_ticket, validate_url,
        validate_username,
    },
};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// A Client for interacting with the Proxmox VE API
///
/// This client provides a safe, ergonomic interface for:
/// - Authentication and session management
/// - Resource operations (nodes, VMs)
/// - Task monitoring
///
/// Every helper runs under the client's own [`CancellationToken`]; cancelling
/// it aborts whatever requests are in flight.
///
/// # Examples
///
/// ```no_run
/// use pve_session::{ProxmoxClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ProxmoxClient::builder()
///         .host("proxmox.example.com")
///         .port(8006)
///         .credentials("root", "password", "pam")
///         .secure(true)
///         .build()
///         .await?;
///
///     client.login().await?;
///     let version = client.version().await?;
///     println!("{:?}", version.get("version"));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ProxmoxClient {
    api_client: ApiClient,
    cancellation: CancellationToken,
}

/// Builder for ProxmoxClient configuration
#[derive(Debug, Default)]
pub struct ProxmoxClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    api_token: Option<String>,
    realm: Option<String>,
    secure: Option<bool>,
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
    config: ClientConfig,
    session: Option<ProxmoxAuth>,
}

impl ProxmoxClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Defaults to 8006.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Ticket login with a password.
    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self.realm = Some(realm.into());
        self
    }

    /// Stateless access with an API token (`TOKENID=SECRET`); no login is ever made.
    pub fn api_token(
        mut self,
        username: impl Into<String>,
        token: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.api_token = Some(token.into());
        self.realm = Some(realm.into());
        self
    }

    /// Defaults to `pam`.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// `true` (the default) selects HTTPS.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Skips TLS certificate verification. Only for self-signed lab setups.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Per-request timeout, 30 seconds by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Spacing between task status checks in [`ProxmoxClient::wait_for_task`].
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Caps outgoing requests, the login round-trip included, at
    /// `requests_per_second` with bursts of up to `burst_size`.
    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    /// Rejects passwords whose zxcvbn score is below `min_score`.
    pub fn enable_password_strength(mut self, min_score: PasswordScore) -> Self {
        self.config.password_min_score = Some(min_score);
        self
    }

    pub fn block_reserved_usernames(mut self) -> Self {
        self.config.block_reserved_usernames = true;
        self
    }

    /// Restores a session written by [`ProxmoxClient::save_session_to_file`].
    ///
    /// # Errors
    /// `ProxmoxError::Io` if the reader fails, `ProxmoxError::Parse` for
    /// malformed JSON, `ProxmoxError::Validation` for an unusable ticket.
    pub async fn with_session<R>(mut self, mut reader: R) -> ProxmoxResult<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw).await?;

        let auth: ProxmoxAuth = serde_json::from_slice(&raw)
            .map_err(|e| ProxmoxError::Parse(format!("Invalid session data: {}", e)))?;
        validate_ticket(auth.ticket().as_str())?;
        validate_csrf_token(auth.csrf_token().as_str())?;

        self.session = Some(auth);
        Ok(self)
    }

    /// Validates every setting and assembles the client. No request is sent.
    ///
    /// # Errors
    /// `ProxmoxError::Validation` for a missing or malformed setting, or when
    /// neither (or both) of password and API token are given.
    pub async fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let host = self.host.ok_or_else(|| missing("host"))?;
        validate_host(&host)?;

        let port = self.port.unwrap_or(DEFAULT_PORT);
        validate_port(port)?;

        let username = self.username.ok_or_else(|| missing("username"))?;
        validate_username(&username, self.config.block_reserved_usernames)?;

        let realm = self.realm.unwrap_or_else(|| DEFAULT_REALM.to_string());
        validate_realm(&realm)?;

        let credential = match (self.password, self.api_token) {
            (Some(password), None) => {
                validate_password(&password, self.config.password_min_score)?;
                Credential::Password(ProxmoxPassword::new_unchecked(password))
            }
            (None, Some(token)) => {
                validate_api_token(&token)?;
                Credential::ApiToken(ProxmoxApiToken::new_unchecked(&token))
            }
            (None, None) => return Err(missing("password or api_token")),
            (Some(_), Some(_)) => {
                return Err(ValidationError::ConstraintViolation(
                    "Password and API token are mutually exclusive".to_string(),
                )
                .into());
            }
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        require_positive("timeout", timeout)?;
        require_positive("poll_interval", self.config.poll_interval)?;

        let host = ProxmoxHost::new_unchecked(host);
        let port = ProxmoxPort::new_unchecked(port);
        let secure = self.secure.unwrap_or(true);
        let url = ProxmoxUrl::from_parts(&host, port, secure);
        validate_url(&url)?;

        let connection = ProxmoxConnection::new(
            host,
            port,
            ProxmoxUsername::new_unchecked(username),
            credential,
            ProxmoxRealm::new_unchecked(realm),
            secure,
            self.accept_invalid_certs,
            timeout,
            ProxmoxUrl::new_unchecked(url),
        );

        let api_client = ApiClient::new(connection, self.config)?;
        if let Some(session) = self.session {
            debug!("restoring persisted session");
            api_client.set_auth(session).await;
        }

        Ok(ProxmoxClient {
            api_client,
            cancellation: CancellationToken::new(),
        })
    }
}

fn missing(field: &str) -> ProxmoxError {
    ValidationError::Field {
        field: field.to_string(),
        message: format!("{} is required", field),
    }
    .into()
}

fn require_positive(field: &str, value: Duration) -> Result<(), ValidationError> {
    if value.is_zero() {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("{} must be greater than zero", field),
        });
    }
    Ok(())
}

impl ProxmoxClient {
    /// Creates a new builder for ProxmoxClient configuration
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    /// The underlying session client, for endpoints without a helper here.
    pub fn api(&self) -> &ApiClient {
        &self.api_client
    }

    /// Token that aborts every request issued through this client's helpers.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Authenticates with the Proxmox server
    ///
    /// Stores the new ticket and CSRF token, replacing any previous session.
    /// With an API token configured this returns immediately.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// - The credentials are rejected (`ProxmoxError::Authentication`)
    /// - The server is unreachable (`ProxmoxError::Connection`)
    /// - The server returns an unexpected status code (`ProxmoxError::Api`)
    pub async fn login(&self) -> ProxmoxResult<()> {
        self.api_client.authenticate(&self.cancellation).await
    }

    /// Forgets the current session; later requests go out anonymously.
    pub async fn logout(&self) {
        self.api_client.clear_auth().await;
    }

    /// Returns true if the client holds a live session or an API token
    pub async fn is_authenticated(&self) -> bool {
        self.api_client.is_authenticated().await
    }

    /// Returns the current authentication ticket if authenticated
    pub async fn auth_token(&self) -> Option<ProxmoxTicket> {
        self.api_client.auth().await.map(|auth| auth.ticket().clone())
    }

    /// Returns the current CSRF token if authenticated
    pub async fn csrf_token(&self) -> Option<ProxmoxCSRFToken> {
        self.api_client
            .auth()
            .await
            .map(|auth| auth.csrf_token().clone())
    }

    /// Writes the current session as JSON so another process can reuse it.
    ///
    /// # Errors
    /// `ProxmoxError::Validation` when there is no session to save,
    /// `ProxmoxError::Io` if the file cannot be written.
    pub async fn save_session_to_file(&self, path: impl AsRef<Path>) -> ProxmoxResult<()> {
        let auth = self.api_client.auth().await.ok_or_else(|| ValidationError::Field {
            field: "session".to_string(),
            message: "No session to save, call login() first".to_string(),
        })?;
        let json = serde_json::to_vec_pretty(&auth)
            .map_err(|e| ProxmoxError::Parse(format!("Failed to serialize session: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// `GET /version`, kept as an ordered untyped map.
    pub async fn version(&self) -> ProxmoxResult<DynamicMap> {
        self.fetch("version").await
    }

    /// Lists the cluster nodes.
    pub async fn nodes(&self) -> ProxmoxResult<Vec<NodeListItem>> {
        self.fetch("nodes").await
    }

    pub async fn node_status(&self, node: &str) -> ProxmoxResult<NodeStatus> {
        require_path_segment("node", node)?;
        self.fetch(&format!("nodes/{}/status", node)).await
    }

    /// Lists the QEMU guests on `node`.
    pub async fn vms(&self, node: &str) -> ProxmoxResult<Vec<VmListItem>> {
        require_path_segment("node", node)?;
        self.fetch(&format!("nodes/{}/qemu", node)).await
    }

    pub async fn vm_config(&self, node: &str, vmid: u32) -> ProxmoxResult<VmConfig> {
        require_path_segment("node", node)?;
        validate_vmid(vmid)?;
        self.fetch(&format!("nodes/{}/qemu/{}/config", node, vmid))
            .await
    }

    /// Creates a VM. The server does the work in a task; see [`Self::wait_for_task`].
    pub async fn create_vm(
        &self,
        node: &str,
        params: &CreateVmParams,
    ) -> ProxmoxResult<TaskHandle> {
        require_path_segment("node", node)?;
        validate_vmid(params.vmid)?;
        let envelope: ApiEnvelope<String> = self
            .api_client
            .post(
                &format!("nodes/{}/qemu", node),
                Some(Body::form(params)?),
                &self.cancellation,
            )
            .await?;
        envelope.into_data().map(TaskHandle::from)
    }

    /// Applies a partial configuration change synchronously.
    ///
    /// # Errors
    /// `ProxmoxError::Validation` for an update that changes nothing.
    pub async fn update_vm_config(
        &self,
        node: &str,
        vmid: u32,
        update: &VmConfigUpdate,
    ) -> ProxmoxResult<()> {
        require_path_segment("node", node)?;
        validate_vmid(vmid)?;
        if update.is_empty() {
            return Err(ValidationError::ConstraintViolation(
                "Configuration update is empty".to_string(),
            )
            .into());
        }
        let envelope: ApiEnvelope<Value> = self
            .api_client
            .put(
                &format!("nodes/{}/qemu/{}/config", node, vmid),
                Some(Body::form(update)?),
                &self.cancellation,
            )
            .await?;
        envelope.into_data().map(drop)
    }

    pub async fn start_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<TaskHandle> {
        self.vm_power_action(node, vmid, "start").await
    }

    /// Hard stop, like pulling the plug.
    pub async fn stop_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<TaskHandle> {
        self.vm_power_action(node, vmid, "stop").await
    }

    /// ACPI shutdown; the guest decides when it is done.
    pub async fn shutdown_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<TaskHandle> {
        self.vm_power_action(node, vmid, "shutdown").await
    }

    pub async fn reboot_vm(&self, node: &str, vmid: u32) -> ProxmoxResult<TaskHandle> {
        self.vm_power_action(node, vmid, "reboot").await
    }

    /// Reports whether the VM answers its status endpoint.
    ///
    /// Any failure, including transport errors and invalid arguments, reads as
    /// `false`. Use [`Self::vm_config`] when the reason matters.
    pub async fn vm_exists(&self, node: &str, vmid: u32) -> bool {
        let checked = require_path_segment("node", node).and_then(|()| validate_vmid(vmid));
        let result: ProxmoxResult<DynamicMap> = match checked {
            Ok(()) => {
                self.fetch(&format!("nodes/{}/qemu/{}/status/current", node, vmid))
                    .await
            }
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                debug!(node, vmid, error = %e, "treating VM as absent");
                false
            }
        }
    }

    /// One status snapshot of a task.
    pub async fn task_status(&self, node: &str, upid: &str) -> ProxmoxResult<TaskStatus> {
        self.api_client
            .task_status(node, upid, &self.cancellation)
            .await
    }

    /// Polls a task until it stops running, checking every `poll_interval`.
    ///
    /// # Errors
    /// `ProxmoxError::Timeout` once `timeout` elapses, `ProxmoxError::Cancelled`
    /// on cancellation, and any error from a status check, unretried.
    pub async fn wait_for_task(
        &self,
        node: &str,
        upid: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<TaskStatus> {
        WaitTaskService::new(self.api_client.config().poll_interval)
            .execute(&self.api_client, node, upid, timeout, cancel)
            .await
    }

    async fn vm_power_action(
        &self,
        node: &str,
        vmid: u32,
        action: &str,
    ) -> ProxmoxResult<TaskHandle> {
        require_path_segment("node", node)?;
        validate_vmid(vmid)?;
        let envelope: ApiEnvelope<String> = self
            .api_client
            .post(
                &format!("nodes/{}/qemu/{}/status/{}", node, vmid, action),
                None,
                &self.cancellation,
            )
            .await?;
        envelope.into_data().map(TaskHandle::from)
    }

    async fn fetch<T>(&self, path: &str) -> ProxmoxResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let envelope: ApiEnvelope<T> = self.api_client.get(path, None, &self.cancellation).await?;
        envelope.into_data()
    }
}
