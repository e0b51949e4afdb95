//! Orvio HTTP clients
//!
//! Split into a public client for the token-less sign-in bootstrap endpoints
//! and an authenticated client that attaches a bearer access token and
//! recovers once from an expired token via the refresh endpoint.

pub mod auth;
pub mod error;
pub mod service;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::session::Session;
use crate::types::{RefreshRequest, RefreshResponse};
use error::ClientError;

const USER_AGENT: &str = concat!("orvio-client/", env!("CARGO_PKG_VERSION"));

/// Client for public endpoints that don't require authentication
#[derive(Clone)]
pub struct PublicOrvioClient {
    client: Client,
    base_url: String,
}

/// Client for bearer-authenticated endpoints
///
/// Holds the session token pair for its own lifetime. On a first-attempt 401
/// it exchanges the refresh token for a new access token and replays the
/// request exactly once; the refreshed token replaces the in-memory copy
/// only. Callers that persist sessions read the pair back via
/// [`AuthenticatedOrvioClient::session`].
#[derive(Clone)]
pub struct AuthenticatedOrvioClient {
    client: Client,
    base_url: String,
    access_token: Arc<RwLock<String>>,
    refresh_token: String,
}

/// One outgoing request plus its retry state
///
/// `attempt` is the explicit retry marker: a request that has already been
/// replayed is never replayed again, however many 401s the server keeps
/// returning.
struct RequestContext {
    method: Method,
    path: String,
    body: Option<JsonValue>,
    attempt: u8,
}

impl PublicOrvioClient {
    /// Create a new public client
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new_with_timeout(base_url, None)
    }

    fn new_with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = build_transport(timeout)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder without authentication
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Attach a session to get an authenticated client reusing this transport
    pub fn authenticate(self, session: Session) -> AuthenticatedOrvioClient {
        AuthenticatedOrvioClient {
            client: self.client,
            base_url: self.base_url,
            access_token: Arc::new(RwLock::new(session.access_token)),
            refresh_token: session.refresh_token,
        }
    }
}

impl AuthenticatedOrvioClient {
    /// Create a new authenticated client from a session token pair
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self, ClientError> {
        Self::new_with_timeout(base_url, session, None)
    }

    fn new_with_timeout(
        base_url: impl Into<String>,
        session: Session,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        Ok(PublicOrvioClient::new_with_timeout(base_url, timeout)?.authenticate(session))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token pair this client currently holds in memory
    ///
    /// Reflects any access-token rotation performed by a transparent refresh;
    /// callers owning a session store save this back after requests.
    pub fn session(&self) -> Session {
        Session {
            access_token: self.current_access_token(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    /// Create a public client (useful for calling public endpoints)
    pub fn to_public(&self) -> PublicOrvioClient {
        PublicOrvioClient {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        }
    }

    fn current_access_token(&self) -> String {
        self.access_token
            .read()
            .expect("access token lock poisoned")
            .clone()
    }

    fn set_access_token(&self, token: String) {
        *self
            .access_token
            .write()
            .expect("access token lock poisoned") = token;
    }

    /// Execute a bearer-authenticated request with retry-once on 401
    ///
    /// reqwest builders are single-use, so a replay rebuilds the request from
    /// the context with the refreshed token. Any non-401 failure and any
    /// failure on the replay itself are surfaced as-is; a refresh failure
    /// takes precedence over the 401 that triggered it.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> Result<T, ClientError> {
        let mut ctx = RequestContext {
            method,
            path: path.to_string(),
            body,
            attempt: 0,
        };

        loop {
            let response = self.build_request(&ctx).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.json().await?);
            }

            if status == StatusCode::UNAUTHORIZED && ctx.attempt == 0 {
                ctx.attempt += 1;
                debug!(path = %ctx.path, "access token rejected, refreshing");
                self.refresh_access_token().await?;
                continue;
            }

            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::from_status(status, message));
        }
    }

    /// Serialize a body and execute
    pub(crate) async fn execute_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.execute(method, path, Some(body)).await
    }

    fn build_request(&self, ctx: &RequestContext) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, ctx.path);
        let mut request = self.client.request(ctx.method.clone(), url).header(
            header::AUTHORIZATION,
            format!("Bearer {}", self.current_access_token()),
        );
        if let Some(body) = &ctx.body {
            request = request.json(body);
        }
        request
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Called unauthenticated, like the sign-in bootstrap endpoints. No
    /// de-duplication across concurrent requests: two simultaneous 401s each
    /// run their own exchange.
    async fn refresh_access_token(&self) -> Result<(), ClientError> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&RefreshRequest {
                refresh_token: self.refresh_token.clone(),
            })
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::from_status(status, message));
        }

        let refreshed: RefreshResponse = response.json().await?;
        self.set_access_token(refreshed.access_token);
        debug!("access token refreshed");
        Ok(())
    }
}

fn build_transport(timeout: Option<Duration>) -> Result<Client, ClientError> {
    let mut builder = ClientBuilder::new().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Builder that creates the appropriate client type
pub struct OrvioClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl OrvioClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
        }
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a public client
    pub fn build_public(self) -> Result<PublicOrvioClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        PublicOrvioClient::new_with_timeout(base_url, self.timeout)
    }

    /// Build an authenticated client
    pub fn build_authenticated(
        self,
        session: Session,
    ) -> Result<AuthenticatedOrvioClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        AuthenticatedOrvioClient::new_with_timeout(base_url, session, self.timeout)
    }
}

impl Default for OrvioClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
