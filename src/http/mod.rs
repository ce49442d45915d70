//! HTTP module
//!
//! Provides the request description the Spotify helpers build and the
//! authenticated client that executes it.
//!
//! # Features
//!
//! - **Request descriptors**: method, URL, headers, body, query, JSON flag
//! - **OAuth2 transport**: bearer attachment with token refresh
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod request;

pub use client::{AuthenticatedClient, HttpClientConfig, HttpClientConfigBuilder, OAuth2HttpClient};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::{is_empty_body, query_pairs, RequestDescriptor};
