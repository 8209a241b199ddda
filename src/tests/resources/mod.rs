mod node_tests;
mod task_tests;
mod vm_tests;

use crate::{ProxmoxAuth, ProxmoxCSRFToken, ProxmoxClient, ProxmoxTicket};
use std::time::Duration;
use wiremock::MockServer;

pub(crate) const TICKET: &str = "PVE:root@pam:4EEC61E2::sig";
pub(crate) const CSRF: &str = "4EEC61E2:token";

/// Plain-HTTP client aimed at the mock server, already holding a session.
pub(crate) async fn create_authenticated_client(mock_server: &MockServer) -> ProxmoxClient {
    let client = ProxmoxClient::builder()
        .host("127.0.0.1")
        .port(mock_server.address().port())
        .credentials("root", "s3cret", "pam")
        .secure(false)
        .poll_interval(Duration::from_millis(20))
        .build()
        .await
        .unwrap();

    client
        .api()
        .set_auth(ProxmoxAuth::new(
            ProxmoxTicket::new_unchecked(TICKET.to_string()),
            ProxmoxCSRFToken::new_unchecked(CSRF.to_string()),
        ))
        .await;
    client
}
