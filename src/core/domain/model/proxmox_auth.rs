use crate::core::domain::value_object::{
    ProxmoxCSRFToken, ProxmoxTicket, serde_helpers::system_time,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// How long Proxmox VE accepts a ticket after it was issued.
pub const TICKET_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// The session state obtained from a successful login.
///
/// Ticket and CSRF token always travel together; the pair is replaced
/// wholesale on every (re-)authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxmoxAuth {
    ticket: ProxmoxTicket,
    csrf_token: ProxmoxCSRFToken,
    #[serde(with = "system_time")]
    issued_at: SystemTime,
}

impl ProxmoxAuth {
    /// Creates a session issued now.
    pub fn new(ticket: ProxmoxTicket, csrf_token: ProxmoxCSRFToken) -> Self {
        Self::with_issued_at(ticket, csrf_token, SystemTime::now())
    }

    pub fn with_issued_at(
        ticket: ProxmoxTicket,
        csrf_token: ProxmoxCSRFToken,
        issued_at: SystemTime,
    ) -> Self {
        Self {
            ticket,
            csrf_token,
            issued_at,
        }
    }

    pub fn ticket(&self) -> &ProxmoxTicket {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &ProxmoxCSRFToken {
        &self.csrf_token
    }

    pub fn issued(&self) -> SystemTime {
        self.issued_at
    }

    /// Checks if the session is older than `lifetime`.
    ///
    /// A clock that moved backwards past the issue time counts as expired.
    #[must_use]
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.issued_at
            .elapsed()
            .map(|age| age > lifetime)
            .unwrap_or(true)
    }
}
