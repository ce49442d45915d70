//! Stored OAuth2 credential types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spotify accounts service token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// OAuth2 credentials as kept by the host's credential store
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct OAuth2Credentials {
    /// Current access token
    pub access_token: String,
    /// Refresh token, if the grant returned one
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// OAuth2 client id (needed to refresh)
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth2 client secret (needed to refresh)
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Token endpoint used for refreshing
    #[serde(default)]
    pub token_url: Option<String>,
    /// When the access token expires
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes (space separated)
    #[serde(default)]
    pub scope: Option<String>,
}

impl OAuth2Credentials {
    /// Credentials holding only an access token
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            ..Default::default()
        }
    }

    /// Attach refresh data
    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh_token: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the token endpoint
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Set the access token expiry
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Token endpoint, falling back to Spotify's accounts service
    pub fn token_url(&self) -> &str {
        self.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL)
    }

    /// Whether a refresh-token grant can be attempted
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Check if the stored access token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for OAuth2Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Credentials")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("client_id", &self.client_id)
            .field("token_url", &self.token_url)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
