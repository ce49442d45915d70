//! Spotify Web API helpers
//!
//! ```text
//! spotify_api_request_all_items ──► spotify_api_request ──► build_request
//!                                          │
//!                                          ▼
//!                    ExecutionContext { CredentialStore, AuthenticatedClient }
//! ```
//!
//! Both helpers are stateless; every call receives its capabilities through
//! an [`ExecutionContext`].

mod context;
mod dispatcher;
mod pagination;
mod request;

pub use context::ExecutionContext;
pub use dispatcher::spotify_api_request;
pub use pagination::{next_page, spotify_api_request_all_items, NextPage};
pub use request::{
    build_request, ACCEPT, API_BASE_URL, CONTENT_TYPE, CREDENTIAL_TYPE, INTEGRATION_NAME,
    USER_AGENT,
};

#[cfg(test)]
mod tests;
