//! Credential store implementations

use super::types::OAuth2Credentials;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

/// Host capability returning stored OAuth2 credentials per credential type
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up credentials; `Ok(None)` when none are configured
    async fn get_credentials(&self, credential_type: &str) -> Result<Option<OAuth2Credentials>>;
}

/// Credentials kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<String, OAuth2Credentials>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single entry
    pub fn with_entry(credential_type: impl Into<String>, credentials: OAuth2Credentials) -> Self {
        let mut entries = HashMap::new();
        entries.insert(credential_type.into(), credentials);
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Insert or replace credentials
    pub async fn insert(&self, credential_type: impl Into<String>, credentials: OAuth2Credentials) {
        self.entries
            .write()
            .await
            .insert(credential_type.into(), credentials);
    }

    /// Remove credentials, returning what was stored
    pub async fn remove(&self, credential_type: &str) -> Option<OAuth2Credentials> {
        self.entries.write().await.remove(credential_type)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_credentials(&self, credential_type: &str) -> Result<Option<OAuth2Credentials>> {
        Ok(self.entries.read().await.get(credential_type).cloned())
    }
}

/// Credentials read from a JSON or YAML file mapping credential type to credentials.
///
/// ```json
/// { "spotifyOAuth2Api": { "access_token": "...", "refresh_token": "..." } }
/// ```
///
/// The file is re-read on every lookup so external token rotation is picked up.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, OAuth2Credentials>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound {
                    path: self.path.display().to_string(),
                });
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let is_yaml = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get_credentials(&self, credential_type: &str) -> Result<Option<OAuth2Credentials>> {
        let mut entries = self.load().await?;
        debug!(
            "Loaded {} credential entries from {}",
            entries.len(),
            self.path.display()
        );
        Ok(entries.remove(credential_type))
    }
}
