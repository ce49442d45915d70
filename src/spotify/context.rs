//! Capabilities the helpers run with

use super::request::API_BASE_URL;
use crate::credentials::CredentialStore;
use crate::http::AuthenticatedClient;
use std::sync::Arc;

/// Host capabilities handed to every helper call
#[derive(Clone)]
pub struct ExecutionContext {
    credentials: Arc<dyn CredentialStore>,
    client: Arc<dyn AuthenticatedClient>,
    base_url: String,
}

impl ExecutionContext {
    /// Create a context against the public Spotify API
    pub fn new(credentials: Arc<dyn CredentialStore>, client: Arc<dyn AuthenticatedClient>) -> Self {
        Self {
            credentials,
            client,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point endpoint composition at another base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Credential store capability
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Authenticated transport capability
    pub fn client(&self) -> &dyn AuthenticatedClient {
        self.client.as_ref()
    }

    /// Base URL endpoints are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
