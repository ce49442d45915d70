//! # Spotify Connector
//!
//! Helpers that let a workflow node call the Spotify Web API: build the
//! request, dispatch it through the host's OAuth2-aware HTTP client, and
//! follow `next` links to collect every item of a list endpoint.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spotify_connector::credentials::{InMemoryCredentialStore, OAuth2Credentials};
//! use spotify_connector::http::OAuth2HttpClient;
//! use spotify_connector::spotify::{spotify_api_request_all_items, ExecutionContext, CREDENTIAL_TYPE};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> spotify_connector::Result<()> {
//!     let store = Arc::new(InMemoryCredentialStore::with_entry(
//!         CREDENTIAL_TYPE,
//!         OAuth2Credentials::from_access_token("BQD..."),
//!     ));
//!     let client = Arc::new(OAuth2HttpClient::new(store.clone())?);
//!     let ctx = ExecutionContext::new(store, client);
//!
//!     let playlists = spotify_api_request_all_items(
//!         &ctx, "items", "GET", "/me/playlists", &serde_json::json!({}), None,
//!     )
//!     .await?;
//!     println!("{} playlists", playlists.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  spotify_api_request_all_items  →  spotify_api_request       │
//! │        (follow `next`)              (build, check, wrap)     │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ ExecutionContext
//! ┌──────────────────┬───────────┴──────────┬────────────────────┐
//! │ CredentialStore  │ AuthenticatedClient  │ Authenticator      │
//! ├──────────────────┼──────────────────────┼────────────────────┤
//! │ In-memory        │ Bearer token         │ Token cache        │
//! │ File (JSON/YAML) │ Retry / Rate limit   │ Refresh grant      │
//! └──────────────────┴──────────────────────┴────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Token resolution and refresh
pub mod auth;

/// Credential stores
pub mod credentials;

/// Request descriptors and the authenticated HTTP client
pub mod http;

/// Spotify request, dispatch and pagination helpers
pub mod spotify;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use spotify::{spotify_api_request, spotify_api_request_all_items, ExecutionContext};

