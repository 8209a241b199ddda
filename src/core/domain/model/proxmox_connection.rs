use crate::core::domain::value_object::{
    ProxmoxApiToken, ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm, ProxmoxUrl,
    ProxmoxUsername,
};
use std::time::Duration;

/// Per-request timeout used when the caller does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the client proves its identity to the server.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Password login through `POST /access/ticket`, yielding a session ticket.
    Password(ProxmoxPassword),
    /// API token sent on every request; no login round-trip.
    ApiToken(ProxmoxApiToken),
}

/// Immutable connection settings for a single Proxmox VE server.
#[derive(Debug, Clone)]
pub struct ProxmoxConnection {
    host: ProxmoxHost,
    port: ProxmoxPort,
    username: ProxmoxUsername,
    credential: Credential,
    realm: ProxmoxRealm,
    secure: bool,
    accept_invalid_certs: bool,
    timeout: Duration,
    url: ProxmoxUrl,
}

impl ProxmoxConnection {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: ProxmoxHost,
        port: ProxmoxPort,
        username: ProxmoxUsername,
        credential: Credential,
        realm: ProxmoxRealm,
        secure: bool,
        accept_invalid_certs: bool,
        timeout: Duration,
        url: ProxmoxUrl,
    ) -> Self {
        Self {
            host,
            port,
            username,
            credential,
            realm,
            secure,
            accept_invalid_certs,
            timeout,
            url,
        }
    }

    pub fn host(&self) -> &ProxmoxHost {
        &self.host
    }

    pub fn port(&self) -> ProxmoxPort {
        self.port
    }

    pub fn username(&self) -> &ProxmoxUsername {
        &self.username
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn realm(&self) -> &ProxmoxRealm {
        &self.realm
    }

    /// `user@realm` as the server expects it.
    pub fn qualified_username(&self) -> String {
        self.username.qualified(&self.realm)
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Whether TLS certificate validation is disabled (development only).
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self) -> &ProxmoxUrl {
        &self.url
    }

    /// Value of the `Authorization` header when an API token is configured.
    pub fn api_token_header(&self) -> Option<String> {
        match &self.credential {
            Credential::ApiToken(token) => {
                Some(token.as_authorization_header(&self.qualified_username()))
            }
            Credential::Password(_) => None,
        }
    }
}
