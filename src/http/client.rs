//! OAuth2-authenticated HTTP client
//!
//! `AuthenticatedClient` is the host capability the Spotify helpers call
//! through. `OAuth2HttpClient` is the default implementation on top of
//! reqwest:
//! - bearer token from the credential store, refreshed when expired
//! - one forced refresh and replay when the API answers 401
//! - rate limiting and retries with configurable backoff
//! - JSON or text response decoding

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::request::RequestDescriptor;
use crate::auth::Authenticator;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Host capability performing authenticated transport for a credential type
#[async_trait]
pub trait AuthenticatedClient: Send + Sync {
    /// Execute the request with the credentials stored under `credential_type`
    /// and return the decoded response body.
    async fn request_oauth2(
        &self,
        credential_type: &str,
        request: RequestDescriptor,
    ) -> Result<JsonValue>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// reqwest-backed `AuthenticatedClient`
pub struct OAuth2HttpClient {
    client: Client,
    config: HttpClientConfig,
    credentials: Arc<dyn CredentialStore>,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
}

impl OAuth2HttpClient {
    /// Create a client with default configuration
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::with_config(HttpClientConfig::default(), credentials)
    }

    /// Create a client with custom configuration
    pub fn with_config(
        config: HttpClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            authenticator: Authenticator::with_client(client.clone()),
            client,
            config,
            credentials,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }

    /// Turn a descriptor into a reqwest builder.
    ///
    /// Headers go out verbatim; the body is serialized by hand so a declared
    /// content type is never replaced.
    fn build_request(
        &self,
        method: &Method,
        request: &RequestDescriptor,
        token: &str,
    ) -> Result<RequestBuilder> {
        let mut req = self.client.request(method.clone(), &request.uri);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        if let Some(ref body) = request.body {
            req = match body {
                JsonValue::String(text) if !request.json => req.body(text.clone()),
                _ => req.body(serde_json::to_vec(body)?),
            };
        }

        Ok(req.bearer_auth(token))
    }

    /// Send with rate limiting and retries. Non-2xx answers become `HttpStatus`.
    async fn send_with_retry(
        &self,
        method: &Method,
        request: &RequestDescriptor,
        token: &str,
    ) -> Result<Response> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let req = self.build_request(method, request, token)?;

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = extract_retry_after(&response);
                        if attempt < max_retries {
                            warn!(
                                "Rate limited (429), attempt {}/{}, waiting {}s",
                                attempt + 1,
                                max_retries + 1,
                                retry_after
                            );
                            tokio::time::sleep(Duration::from_secs(retry_after)).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(Error::RateLimited {
                            retry_after_seconds: retry_after,
                        });
                    }

                    if is_retryable_status(status) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::http_status(status.as_u16(), ""));
                        continue;
                    }

                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::http_status(status.as_u16(), body));
                    }

                    debug!("Request succeeded: {} {}", method, request.uri);
                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        let timeout_ms = self.config.timeout.as_millis() as u64;
                        if attempt < max_retries {
                            let delay = self.calculate_backoff(attempt);
                            warn!(
                                "Request timeout, attempt {}/{}, retrying in {:?}",
                                attempt + 1,
                                max_retries + 1,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            last_error = Some(Error::Timeout { timeout_ms });
                            continue;
                        }
                        return Err(Error::Timeout { timeout_ms });
                    }

                    if e.is_connect() && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Connection error, attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::Http(e));
                        continue;
                    }

                    return Err(Error::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }
}

#[async_trait]
impl AuthenticatedClient for OAuth2HttpClient {
    async fn request_oauth2(
        &self,
        credential_type: &str,
        request: RequestDescriptor,
    ) -> Result<JsonValue> {
        let credentials = self
            .credentials
            .get_credentials(credential_type)
            .await?
            .ok_or_else(|| Error::credential_not_found(credential_type))?;

        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|_| Error::InvalidMethod {
                method: request.method.clone(),
            })?;

        let token = self
            .authenticator
            .access_token(credential_type, &credentials)
            .await?;

        let response = match self.send_with_retry(&method, &request, &token).await {
            Err(Error::HttpStatus { status: 401, .. }) if credentials.can_refresh() => {
                warn!(
                    "Access token for '{}' rejected, refreshing and replaying",
                    credential_type
                );
                let token = self
                    .authenticator
                    .refresh(credential_type, &credentials)
                    .await?;
                self.send_with_retry(&method, &request, &token).await?
            }
            other => other?,
        };

        decode_response(response, request.json).await
    }
}

impl std::fmt::Debug for OAuth2HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Decode a successful response. Empty JSON bodies (e.g. 204) become `null`.
async fn decode_response(response: Response, json: bool) -> Result<JsonValue> {
    let text = response.text().await.map_err(Error::Http)?;

    if !json {
        return Ok(JsonValue::String(text));
    }
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }

    Ok(serde_json::from_str(&text)?)
}

/// Check if an HTTP status is retryable
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
