//! Internal HTTP client that owns one authenticated session against a Proxmox VE server.

use crate::{
    ClientConfig, ProxmoxAuth, ProxmoxConnection, ProxmoxError, ProxmoxResult,
    auth::application::service::login_service::LoginService,
    core::domain::{error::ValidationError, value_object::CSRF_HEADER},
    core::infrastructure::request_body::{Body, encode_pairs},
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE},
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// HTTP client that attaches session credentials and maps responses.
///
/// The session ticket goes out as the `PVEAuthCookie` cookie on every request;
/// the `CSRFPreventionToken` header is added on state-changing verbs only.
/// With an API token configured, the `Authorization` header replaces both and
/// no login round-trip is ever made.
///
/// Session state sits behind a `RwLock`, so one client can be shared between
/// tasks: requests read it, [`ApiClient::authenticate`] replaces it wholesale.
/// The client never re-authenticates on its own; a `401` surfaces as
/// [`ProxmoxError::Api`] and the caller decides whether to log in again.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<ProxmoxConnection>,
    auth: Arc<RwLock<Option<ProxmoxAuth>>>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Connection` if the HTTP client cannot be built and
    /// `ProxmoxError::Validation` for a zero rate limit.
    pub fn new(connection: ProxmoxConnection, config: ClientConfig) -> ProxmoxResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .timeout(connection.timeout())
            .build()
            .map_err(|e| ProxmoxError::connection("Failed to build HTTP client", e))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = non_zero("requests_per_second", rl.requests_per_second)?;
                let burst = non_zero("burst_size", rl.burst_size)?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            auth: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    /// Returns the non-connection settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sets the authentication state (used after a successful login or session restore).
    pub async fn set_auth(&self, auth: ProxmoxAuth) {
        let mut lock = self.auth.write().await;
        *lock = Some(auth);
    }

    /// Drops the current session; subsequent requests are anonymous.
    pub async fn clear_auth(&self) {
        self.auth.write().await.take();
    }

    /// Returns the current authentication state, if any.
    pub async fn auth(&self) -> Option<ProxmoxAuth> {
        self.auth.read().await.clone()
    }

    /// Returns `true` if the client can make authenticated requests: an API
    /// token is configured, or a session exists that has not outlived the
    /// configured ticket lifetime.
    pub async fn is_authenticated(&self) -> bool {
        if self.connection.api_token_header().is_some() {
            return true;
        }
        let lock = self.auth.read().await;
        lock.as_ref()
            .is_some_and(|a| !a.is_expired(self.config.ticket_lifetime))
    }

    /// Logs in with the configured password and stores the new session.
    ///
    /// Calling it again replaces the session. In API-token mode this is a no-op.
    /// The login request counts against the rate limit like any other request.
    ///
    /// # Errors
    /// `ProxmoxError::Authentication` if the server rejects the credentials
    /// (the stored session is left untouched), `ProxmoxError::Api` for other
    /// non-2xx answers, `ProxmoxError::Connection` for transport failures.
    pub async fn authenticate(&self, cancel: &CancellationToken) -> ProxmoxResult<()> {
        if self.connection.api_token_header().is_some() {
            debug!("API token configured, skipping ticket login");
            return Ok(());
        }

        self.throttle(cancel).await?;
        let auth = LoginService::new()
            .execute(&self.http_client, &self.connection, cancel)
            .await?;
        self.set_auth(auth).await;
        info!(
            user = %self.connection.qualified_username(),
            "authenticated against Proxmox VE"
        );
        Ok(())
    }

    /// Performs a GET request. A body, if any, should be [`Body::Query`].
    ///
    /// # Type Parameters
    /// - `T`: The expected response type (must implement `DeserializeOwned`).
    ///
    /// # Errors
    /// `ProxmoxError::Api` for non-2xx statuses, `ProxmoxError::Connection` for
    /// transport failures, `ProxmoxError::Parse` if the body does not match `T`,
    /// `ProxmoxError::Cancelled` if `cancel` fires first.
    pub async fn get<T>(
        &self,
        path: &str,
        body: Option<Body>,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::GET, path, body, cancel).await
    }

    /// Performs a POST request.
    ///
    /// # Errors
    /// Same as [`ApiClient::get`].
    pub async fn post<T>(
        &self,
        path: &str,
        body: Option<Body>,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::POST, path, body, cancel).await
    }

    /// Performs a PUT request.
    ///
    /// # Errors
    /// Same as [`ApiClient::get`].
    pub async fn put<T>(
        &self,
        path: &str,
        body: Option<Body>,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::PUT, path, body, cancel).await
    }

    /// Performs a DELETE request. A body, if any, should be [`Body::Query`].
    ///
    /// # Errors
    /// Same as [`ApiClient::get`].
    pub async fn delete<T>(
        &self,
        path: &str,
        body: Option<Body>,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(Method::DELETE, path, body, cancel).await
    }

    /// Waits for a slot from the rate limiter, if one is configured.
    async fn throttle(&self, cancel: &CancellationToken) -> ProxmoxResult<()> {
        if let Some(limiter) = &self.rate_limiter {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProxmoxError::Cancelled),
                _ = limiter.until_ready() => {}
            }
        }
        Ok(())
    }

    /// Core request execution: throttle, build, attach credentials, send, map.
    async fn execute_request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        cancel: &CancellationToken,
    ) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        self.throttle(cancel).await?;

        let request = self.build_request(method.clone(), path, body).await?;

        debug!(method = %method, path = %path, "sending request");
        let response = send(request, cancel).await?;
        let status = response.status();
        let text = read_body(response, cancel).await?;

        if !status.is_success() {
            warn!(method = %method, path = %path, status = %status, "request failed");
            return Err(ProxmoxError::Api { status, body: text });
        }
        debug!(method = %method, path = %path, status = %status, "request succeeded");

        parse_body(&text)
    }

    async fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> ProxmoxResult<RequestBuilder> {
        let mut url = url::Url::parse(&self.connection.url().api_url(path))
            .map_err(|e| ValidationError::Format(format!("Invalid request path: {}", e)))?;
        if let Some(Body::Query(pairs)) = &body {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mutating = !matches!(method, Method::GET | Method::HEAD);
        let mut req_builder = self
            .http_client
            .request(method, url.as_str())
            .header(ACCEPT, "application/json");

        if let Some(token) = self.connection.api_token_header() {
            req_builder = req_builder.header(AUTHORIZATION, token);
        } else {
            let auth_guard = self.auth.read().await;
            if let Some(auth) = auth_guard.as_ref() {
                req_builder = req_builder.header(COOKIE, auth.ticket().as_cookie_header());
                if mutating {
                    req_builder = req_builder.header(CSRF_HEADER, auth.csrf_token().as_str());
                }
            }
        }

        req_builder = match body {
            Some(Body::Json(value)) => req_builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            Some(Body::Form(pairs)) => req_builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_pairs(&pairs)),
            Some(Body::Query(_)) | None => req_builder,
        };
        Ok(req_builder)
    }
}

fn non_zero(field: &str, value: u32) -> ProxmoxResult<NonZeroU32> {
    NonZeroU32::new(value).ok_or_else(|| {
        ValidationError::Field {
            field: field.to_string(),
            message: "Rate limit values must be greater than 0".to_string(),
        }
        .into()
    })
}

/// Sends a request, aborting it if `cancel` fires first.
pub(crate) async fn send(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> ProxmoxResult<Response> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProxmoxError::Cancelled),
        result = request.send() => {
            result.map_err(|e| ProxmoxError::connection("HTTP request failed", e))
        }
    }
}

/// Reads the whole response body as text, aborting if `cancel` fires first.
pub(crate) async fn read_body(
    response: Response,
    cancel: &CancellationToken,
) -> ProxmoxResult<String> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProxmoxError::Cancelled),
        result = response.text() => {
            result.map_err(|e| ProxmoxError::connection("Failed to read response", e))
        }
    }
}

/// Decodes a JSON body; an empty body decodes as `null`.
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> ProxmoxResult<T> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text)
        .map_err(|e| ProxmoxError::Parse(format!("Failed to parse response: {}", e)))
}
