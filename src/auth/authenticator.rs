//! Authenticator implementation
//!
//! Picks the bearer token for a request and refreshes it when needed.

use crate::credentials::OAuth2Credentials;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Seconds before expiry at which a token is treated as expired
const EXPIRY_BUFFER_SECONDS: i64 = 30;

/// Token obtained from a refresh-token grant
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Rotated refresh token, when the token endpoint issued a new one
    pub refresh_token: Option<String>,
}

impl CachedToken {
    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            Utc::now() + chrono::Duration::seconds(EXPIRY_BUFFER_SECONDS) >= expires_at
        })
    }
}

/// Authenticator resolving bearer tokens for stored OAuth2 credentials
pub struct Authenticator {
    /// Refreshed tokens keyed by credential type
    cached_tokens: Arc<RwLock<HashMap<String, CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(http_client: Client) -> Self {
        Self {
            cached_tokens: Arc::new(RwLock::new(HashMap::new())),
            http_client,
        }
    }

    /// Get a usable access token, refreshing if the stored one expired.
    ///
    /// An expired token without refresh data is still returned; the API
    /// answers 401 and the caller sees that error.
    pub async fn access_token(
        &self,
        credential_type: &str,
        credentials: &OAuth2Credentials,
    ) -> Result<String> {
        {
            let cached = self.cached_tokens.read().await;
            if let Some(token) = cached.get(credential_type) {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let has_cached = self
            .cached_tokens
            .read()
            .await
            .contains_key(credential_type);

        if !has_cached && !credentials.is_expired() {
            return Ok(credentials.access_token.clone());
        }

        if !credentials.can_refresh() {
            warn!(
                "Access token for '{}' expired and no refresh token is stored",
                credential_type
            );
            return Ok(credentials.access_token.clone());
        }

        let mut cached = self.cached_tokens.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.get(credential_type) {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let refresh_token = cached
            .get(credential_type)
            .and_then(|t| t.refresh_token.clone());
        let new_token = self
            .fetch_refreshed_token(credentials, refresh_token.as_deref())
            .await?;
        let token_str = new_token.token.clone();
        cached.insert(credential_type.to_string(), new_token);

        Ok(token_str)
    }

    /// Force a refresh, e.g. after the API rejected the token with 401
    pub async fn refresh(
        &self,
        credential_type: &str,
        credentials: &OAuth2Credentials,
    ) -> Result<String> {
        if !credentials.can_refresh() {
            return Err(Error::TokenRefresh {
                message: format!("No refresh token stored for '{credential_type}'"),
            });
        }

        let mut cached = self.cached_tokens.write().await;
        let refresh_token = cached
            .get(credential_type)
            .and_then(|t| t.refresh_token.clone());
        let new_token = self
            .fetch_refreshed_token(credentials, refresh_token.as_deref())
            .await?;
        let token_str = new_token.token.clone();
        cached.insert(credential_type.to_string(), new_token);

        Ok(token_str)
    }

    /// Run the refresh-token grant against the credential's token endpoint
    async fn fetch_refreshed_token(
        &self,
        credentials: &OAuth2Credentials,
        rotated_refresh_token: Option<&str>,
    ) -> Result<CachedToken> {
        let (Some(stored_refresh), Some(client_id), Some(client_secret)) = (
            credentials.refresh_token.as_deref(),
            credentials.client_id.as_deref(),
            credentials.client_secret.as_deref(),
        ) else {
            return Err(Error::TokenRefresh {
                message: "Incomplete refresh credentials".to_string(),
            });
        };
        let refresh_token = rotated_refresh_token.unwrap_or(stored_refresh);
        let token_url = credentials.token_url();

        debug!("Refreshing access token at {}", token_url);

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http_client
            .post(token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Refresh token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        let mut token = token_response.into_cached_token();
        if token.refresh_token.is_none() {
            token.refresh_token = rotated_refresh_token.map(String::from);
        }
        Ok(token)
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        CachedToken {
            token: self.access_token,
            expires_at: self
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
            refresh_token: self.refresh_token,
        }
    }
}

/// Extract a scalar from JSON using a simple dotted path.
/// Supports paths like "$.error.message" or "error.message".
pub fn extract_jsonpath(value: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
