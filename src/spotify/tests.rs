//! Tests for the Spotify helpers, run against an in-process fake client

use super::*;
use crate::credentials::{CredentialStore, InMemoryCredentialStore, OAuth2Credentials};
use crate::error::{Error, Result};
use crate::http::{AuthenticatedClient, RequestDescriptor};
use crate::types::JsonValue;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::error::Error as _;
use std::sync::{Arc, Mutex};

/// Fake transport replaying canned responses and recording every call
#[derive(Default)]
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<JsonValue>>>,
    calls: Mutex<Vec<(String, RequestDescriptor)>>,
}

impl ScriptedClient {
    fn with_responses(responses: Vec<Result<JsonValue>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, RequestDescriptor)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthenticatedClient for ScriptedClient {
    async fn request_oauth2(
        &self,
        credential_type: &str,
        request: RequestDescriptor,
    ) -> Result<JsonValue> {
        self.calls
            .lock()
            .unwrap()
            .push((credential_type.to_string(), request));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no scripted response left".to_string())))
    }
}

/// Store whose backing source cannot be read
struct BrokenStore;

#[async_trait]
impl CredentialStore for BrokenStore {
    async fn get_credentials(&self, _credential_type: &str) -> Result<Option<OAuth2Credentials>> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "credentials.json: permission denied",
        )))
    }
}

fn context(client: Arc<ScriptedClient>) -> ExecutionContext {
    let store = Arc::new(InMemoryCredentialStore::with_entry(
        CREDENTIAL_TYPE,
        OAuth2Credentials::from_access_token("token"),
    ));
    ExecutionContext::new(store, client)
}

fn no_body() -> JsonValue {
    json!({})
}

// ============================================================================
// Request Builder Tests
// ============================================================================

#[test]
fn test_build_request_composes_endpoint_and_fixed_headers() {
    let req = build_request(API_BASE_URL, "GET", "/me/tracks", &no_body(), None, None);

    assert_eq!(req.method, "GET");
    assert_eq!(req.uri, "https://api.spotify.com/v1/me/tracks");
    assert_eq!(
        req.headers,
        vec![
            ("User-Agent".to_string(), "n8n".to_string()),
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ]
    );
    assert!(req.body.is_none());
    assert!(req.query.is_empty());
    assert!(req.json);
}

#[test]
fn test_build_request_uri_override_ignores_endpoint() {
    let next = "https://api.spotify.com/v1/me/tracks?offset=20&limit=20";
    let req = build_request(API_BASE_URL, "GET", "/ignored", &no_body(), None, Some(next));
    assert_eq!(req.uri, next);
}

#[test]
fn test_build_request_forwards_body_and_query() {
    let body = json!({"name": "Road trip", "public": false});
    let query = json!({"market": "US", "limit": 10});

    let req = build_request(
        API_BASE_URL,
        "POST",
        "/users/me/playlists",
        &body,
        query.as_object(),
        None,
    );

    assert_eq!(req.body, Some(body));
    assert!(req.query.contains(&("market".to_string(), "US".to_string())));
    assert!(req.query.contains(&("limit".to_string(), "10".to_string())));
}

#[test]
fn test_method_is_forwarded_verbatim() {
    let req = build_request(API_BASE_URL, "purge", "/x", &no_body(), None, None);
    assert_eq!(req.method, "purge");
}

// ============================================================================
// Dispatcher Tests
// ============================================================================

#[tokio::test]
async fn test_dispatcher_returns_response_body() {
    let client = ScriptedClient::with_responses(vec![Ok(json!({"id": "me"}))]);
    let ctx = context(client.clone());

    let body = spotify_api_request(&ctx, "GET", "/me", &no_body(), None, None)
        .await
        .unwrap();

    assert_eq!(body, json!({"id": "me"}));
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "spotifyOAuth2Api");
    assert_eq!(calls[0].1.uri, "https://api.spotify.com/v1/me");
}

#[tokio::test]
async fn test_dispatcher_drops_empty_body() {
    let client = ScriptedClient::with_responses(vec![Ok(JsonValue::Null)]);
    let ctx = context(client.clone());

    spotify_api_request(&ctx, "DELETE", "/me/tracks", &no_body(), None, None)
        .await
        .unwrap();

    assert!(client.calls()[0].1.body.is_none());
}

#[tokio::test]
async fn test_dispatcher_missing_credentials_makes_no_call() {
    let client = ScriptedClient::with_responses(vec![Ok(json!({}))]);
    let ctx = ExecutionContext::new(Arc::new(InMemoryCredentialStore::new()), client.clone());

    let err = spotify_api_request(&ctx, "GET", "/me", &no_body(), None, None)
        .await
        .unwrap_err();

    match err {
        Error::CredentialsMissing { integration } => assert_eq!(integration, "Spotify"),
        other => panic!("Expected CredentialsMissing, got {other:?}"),
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_dispatcher_wraps_credential_store_failures() {
    let client = ScriptedClient::with_responses(vec![Ok(json!({}))]);
    let ctx = ExecutionContext::new(Arc::new(BrokenStore), client.clone());

    let err = spotify_api_request(&ctx, "GET", "/me", &no_body(), None, None)
        .await
        .unwrap_err();

    match &err {
        Error::Api {
            integration,
            status,
            source,
            ..
        } => {
            assert_eq!(integration, "Spotify");
            assert_eq!(*status, None);
            assert!(matches!(**source, Error::Io(_)));
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_dispatcher_wraps_transport_errors() {
    let client = ScriptedClient::with_responses(vec![Err(Error::http_status(
        403,
        r#"{"error": {"status": 403, "message": "Player command failed: Premium required"}}"#,
    ))]);
    let ctx = context(client);

    let err = spotify_api_request(&ctx, "PUT", "/me/player/play", &no_body(), None, None)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Spotify API error: Player command failed: Premium required"
    );
    assert_eq!(err.status(), Some(403));
    let source = err.source().unwrap();
    assert!(source.to_string().starts_with("HTTP 403"));
}

#[tokio::test]
async fn test_dispatcher_wraps_non_http_errors() {
    let client = ScriptedClient::with_responses(vec![Err(Error::Timeout { timeout_ms: 30_000 })]);
    let ctx = context(client);

    let err = spotify_api_request(&ctx, "GET", "/me", &no_body(), None, None)
        .await
        .unwrap_err();

    match &err {
        Error::Api {
            integration,
            status,
            source,
            ..
        } => {
            assert_eq!(integration, "Spotify");
            assert_eq!(*status, None);
            assert!(matches!(**source, Error::Timeout { timeout_ms: 30_000 }));
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

// ============================================================================
// next_page Tests
// ============================================================================

#[test]
fn test_next_page_variants() {
    assert_eq!(
        next_page(&json!({"next": "https://x/2"})).unwrap(),
        NextPage::Continue("https://x/2".to_string())
    );
    assert_eq!(next_page(&json!({"next": null})).unwrap(), NextPage::Done);
    assert_eq!(next_page(&json!({"next": ""})).unwrap(), NextPage::Done);
    assert_eq!(next_page(&json!({"items": []})).unwrap(), NextPage::Missing);
    assert!(matches!(
        next_page(&json!({"next": 3})),
        Err(Error::Pagination { .. })
    ));
}

// ============================================================================
// Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_paginator_concatenates_pages_in_order() {
    let client = ScriptedClient::with_responses(vec![
        Ok(json!({"items": [1, 2], "next": "u2"})),
        Ok(json!({"items": [3], "next": "u3"})),
        Ok(json!({"items": [4, 5], "next": null})),
    ]);
    let ctx = context(client.clone());

    let items = spotify_api_request_all_items(&ctx, "items", "GET", "/me/tracks", &no_body(), None)
        .await
        .unwrap();

    assert_eq!(items, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);

    let uris: Vec<String> = client.calls().into_iter().map(|(_, r)| r.uri).collect();
    assert_eq!(
        uris,
        vec![
            "https://api.spotify.com/v1/me/tracks".to_string(),
            "u2".to_string(),
            "u3".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_paginator_forwards_query_to_every_page() {
    let client = ScriptedClient::with_responses(vec![
        Ok(json!({"items": ["a"], "next": "https://api.spotify.com/v1/me/tracks?offset=1&limit=1"})),
        Ok(json!({"items": ["b"], "next": null})),
    ]);
    let ctx = context(client.clone());
    let query = json!({"market": "US", "limit": 1});

    let items = spotify_api_request_all_items(
        &ctx,
        "items",
        "GET",
        "/me/tracks",
        &no_body(),
        query.as_object(),
    )
    .await
    .unwrap();

    assert_eq!(items, vec![json!("a"), json!("b")]);
    let calls = client.calls();

    let mut first = calls[0].1.query.clone();
    first.sort();
    assert_eq!(
        first,
        vec![
            ("limit".to_string(), "1".to_string()),
            ("market".to_string(), "US".to_string()),
        ]
    );

    // `limit` is already in the next URL, `market` is not
    assert_eq!(
        calls[1].1.uri,
        "https://api.spotify.com/v1/me/tracks?offset=1&limit=1"
    );
    assert_eq!(calls[1].1.query, vec![("market".to_string(), "US".to_string())]);
}

#[tokio::test]
async fn test_paginator_unparseable_next_with_query_is_an_error() {
    let client = ScriptedClient::with_responses(vec![Ok(json!({"items": [1], "next": "page-2"}))]);
    let ctx = context(client.clone());
    let query = json!({"market": "US"});

    let err = spotify_api_request_all_items(
        &ctx,
        "items",
        "GET",
        "/me/tracks",
        &no_body(),
        query.as_object(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidUrl(_)));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_paginator_stops_when_next_is_absent() {
    let client = ScriptedClient::with_responses(vec![
        Ok(json!({"items": [1], "next": "u2"})),
        Ok(json!({"items": [2]})),
        Ok(json!({"items": [99], "next": null})),
    ]);
    let ctx = context(client.clone());

    let items = spotify_api_request_all_items(&ctx, "items", "GET", "/me/tracks", &no_body(), None)
        .await
        .unwrap();

    assert_eq!(items, vec![json!(1), json!(2)]);
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_paginator_single_page() {
    let client = ScriptedClient::with_responses(vec![Ok(json!({"items": [], "next": null}))]);
    let ctx = context(client.clone());

    let items = spotify_api_request_all_items(&ctx, "items", "GET", "/me/albums", &no_body(), None)
        .await
        .unwrap();

    assert!(items.is_empty());
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_paginator_missing_items_field_is_an_error() {
    let client = ScriptedClient::with_responses(vec![
        Ok(json!({"items": [1], "next": "u2"})),
        Ok(json!({"tracks": [2], "next": null})),
    ]);
    let ctx = context(client);

    let err = spotify_api_request_all_items(&ctx, "items", "GET", "/me/tracks", &no_body(), None)
        .await
        .unwrap_err();

    match err {
        Error::Pagination { message } => assert!(message.contains("'items'")),
        other => panic!("Expected Pagination error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_paginator_non_array_items_is_an_error() {
    let client =
        ScriptedClient::with_responses(vec![Ok(json!({"items": {"a": 1}, "next": null}))]);
    let ctx = context(client);

    let err = spotify_api_request_all_items(&ctx, "items", "GET", "/me/tracks", &no_body(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Pagination { .. }));
}

#[tokio::test]
async fn test_paginator_propagates_wrapped_errors() {
    let client = ScriptedClient::with_responses(vec![
        Ok(json!({"items": [1], "next": "u2"})),
        Err(Error::http_status(500, "boom")),
    ]);
    let ctx = context(client.clone());

    let err = spotify_api_request_all_items(&ctx, "items", "GET", "/me/tracks", &no_body(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { .. }));
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_paginator_uses_custom_property_and_base_url() {
    let client = ScriptedClient::with_responses(vec![Ok(
        json!({"playlists": [{"id": "p1"}], "next": null}),
    )]);
    let ctx = context(client.clone()).with_base_url("http://localhost:9999/v1");

    let items =
        spotify_api_request_all_items(&ctx, "playlists", "GET", "/me/playlists", &no_body(), None)
            .await
            .unwrap();

    assert_eq!(items, vec![json!({"id": "p1"})]);
    assert_eq!(client.calls()[0].1.uri, "http://localhost:9999/v1/me/playlists");
}
