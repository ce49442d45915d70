//! Credential store module
//!
//! The host platform keeps OAuth2 secrets per integration and hands them out
//! by credential type (e.g. `spotifyOAuth2Api`). The `CredentialStore` trait
//! is that seam; two stores are provided:
//!
//! - `InMemoryCredentialStore` for embedding and tests
//! - `FileCredentialStore` reading a JSON/YAML file on every lookup

mod store;
mod types;

pub use store::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use types::{OAuth2Credentials, DEFAULT_TOKEN_URL};
