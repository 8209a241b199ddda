use crate::{
    ProxmoxAuth, ProxmoxCSRFToken, ProxmoxConnection, ProxmoxError, ProxmoxResult, ProxmoxTicket,
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponseData,
    },
    core::domain::{
        model::{api_envelope::ApiEnvelope, proxmox_connection::Credential},
        value_object::{validate_csrf_token, validate_ticket},
    },
    core::infrastructure::{
        api_client::{parse_body, read_body, send},
        request_body::form_encoded,
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Fixed login endpoint, relative to the API root.
pub const LOGIN_PATH: &str = "access/ticket";

/// Exchanges username and password for a session ticket and CSRF token.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// Posts the credentials and returns the resulting session.
    ///
    /// The caller stores the session; a failed login never yields one.
    pub async fn execute(
        &self,
        http_client: &Client,
        connection: &ProxmoxConnection,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let url = connection.url().api_url(LOGIN_PATH);
        let request = self.build_login_request(connection)?;
        let body = form_encoded(&request)?;

        debug!(url = %url, "requesting ticket");
        let response = send(
            http_client
                .post(&url)
                .headers(self.default_headers.clone())
                .body(body),
            cancel,
        )
        .await?;

        let status = response.status();
        let text = read_body(response, cancel).await?;

        match status {
            s if s.is_success() => self.handle_successful_login(&text),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(status = %status, "login rejected");
                Err(ProxmoxError::Authentication(
                    "Invalid credentials provided".to_string(),
                ))
            }
            status => Err(ProxmoxError::Api { status, body: text }),
        }
    }

    fn build_login_request(&self, connection: &ProxmoxConnection) -> ProxmoxResult<LoginRequest> {
        let Credential::Password(password) = connection.credential() else {
            return Err(ProxmoxError::Authentication(
                "Ticket login requires a password".to_string(),
            ));
        };
        Ok(LoginRequest {
            username: connection.qualified_username(),
            password: password.as_str().to_string(),
            realm: connection.realm().as_str().to_string(),
        })
    }

    fn handle_successful_login(&self, text: &str) -> ProxmoxResult<ProxmoxAuth> {
        let envelope: ApiEnvelope<Option<LoginResponseData>> = parse_body(text)?;
        let data = envelope
            .into_data()
            .map_err(|e| ProxmoxError::Authentication(e.to_string()))?
            .ok_or_else(|| {
                ProxmoxError::Authentication("Login response carried no ticket".to_string())
            })?;

        validate_ticket(&data.ticket)?;
        validate_csrf_token(&data.csrf_token)?;

        if let Some(username) = &data.username {
            debug!(user = %username, "ticket issued");
        }

        Ok(ProxmoxAuth::new(
            ProxmoxTicket::new_unchecked(data.ticket),
            ProxmoxCSRFToken::new_unchecked(data.csrf_token),
        ))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
