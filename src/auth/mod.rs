//! Authentication module
//!
//! Resolves the bearer token for a stored OAuth2 credential: uses the stored
//! access token while it is valid and refreshes it with the refresh-token
//! grant once it expires. Refreshed tokens are cached per credential type.

mod authenticator;

pub use authenticator::{extract_jsonpath, Authenticator, CachedToken};
