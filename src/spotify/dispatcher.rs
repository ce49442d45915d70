//! Single authenticated Spotify call

use super::context::ExecutionContext;
use super::request::{build_request, CREDENTIAL_TYPE, INTEGRATION_NAME};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use tracing::debug;

/// Make an API request to Spotify and return the decoded response body.
///
/// Fails with [`Error::CredentialsMissing`] before any network call when the
/// store has no Spotify credentials. Every error from the credential store or
/// the authenticated client is wrapped into [`Error::Api`] tagged "Spotify".
pub async fn spotify_api_request(
    ctx: &ExecutionContext,
    method: &str,
    endpoint: &str,
    body: &JsonValue,
    query: Option<&JsonObject>,
    uri: Option<&str>,
) -> Result<JsonValue> {
    let request = build_request(ctx.base_url(), method, endpoint, body, query, uri);

    let credentials = ctx
        .credentials()
        .get_credentials(CREDENTIAL_TYPE)
        .await
        .map_err(|e| Error::api(INTEGRATION_NAME, e))?;
    if credentials.is_none() {
        return Err(Error::credentials_missing(INTEGRATION_NAME));
    }

    debug!("Spotify request: {} {}", request.method, request.uri);

    ctx.client()
        .request_oauth2(CREDENTIAL_TYPE, request)
        .await
        .map_err(|e| Error::api(INTEGRATION_NAME, e))
}
