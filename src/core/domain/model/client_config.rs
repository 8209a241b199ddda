use crate::core::domain::model::proxmox_auth::TICKET_LIFETIME;
use std::time::Duration;

/// Interval between two task status checks when the caller does not set one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Behaviour switches that are not part of the connection itself.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Age after which a session is reported as expired.
    pub ticket_lifetime: Duration,
    /// Throttle outgoing requests; `None` disables throttling.
    pub rate_limit: Option<RateLimitConfig>,
    /// Reject passwords scoring below this zxcvbn score.
    pub password_min_score: Option<zxcvbn::Score>,
    /// Reject well-known account names such as `root` or `admin`.
    pub block_reserved_usernames: bool,
    /// Spacing between task status checks.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ticket_lifetime: TICKET_LIFETIME,
            rate_limit: None,
            password_min_score: None,
            block_reserved_usernames: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
