//! Spotify request construction

use crate::http::RequestDescriptor;
use crate::types::{JsonObject, JsonValue};

/// Spotify Web API base URL
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Credential type the host stores Spotify OAuth2 secrets under
pub const CREDENTIAL_TYPE: &str = "spotifyOAuth2Api";

/// Integration name attached to upstream errors
pub const INTEGRATION_NAME: &str = "Spotify";

/// `User-Agent` sent with every request
pub const USER_AGENT: &str = "n8n";

/// `Content-Type` sent with every request.
///
/// Declares plain text although bodies are JSON. Must stay byte-identical
/// to the header set existing workflows were recorded against.
pub const CONTENT_TYPE: &str = "text/plain";

/// `Accept` sent with every request
pub const ACCEPT: &str = "application/json";

/// Build the request descriptor for a Spotify call.
///
/// `uri`, when given, is used verbatim and `endpoint` is ignored; otherwise
/// the target is `base_url` followed by `endpoint`. Empty bodies are dropped.
pub fn build_request(
    base_url: &str,
    method: &str,
    endpoint: &str,
    body: &JsonValue,
    query: Option<&JsonObject>,
    uri: Option<&str>,
) -> RequestDescriptor {
    let target = match uri {
        Some(uri) => uri.to_string(),
        None => format!("{base_url}{endpoint}"),
    };

    let mut request = RequestDescriptor::new(method, target)
        .header("User-Agent", USER_AGENT)
        .header("Content-Type", CONTENT_TYPE)
        .header("Accept", ACCEPT)
        .body(body.clone())
        .json(true);

    if let Some(query) = query {
        request = request.query_object(query);
    }

    request
}
