//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::credentials::{
    CredentialStore, FileCredentialStore, InMemoryCredentialStore, OAuth2Credentials,
};
use crate::error::{Error, Result};
use crate::http::OAuth2HttpClient;
use crate::spotify::{
    spotify_api_request, spotify_api_request_all_items, ExecutionContext, CREDENTIAL_TYPE,
};
use crate::types::{JsonObject, JsonValue};
use std::sync::Arc;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let ctx = self.build_context()?;

        match &self.cli.command {
            Commands::Request {
                method,
                endpoint,
                query,
                body,
                uri,
            } => {
                let body = parse_body(body.as_deref())?;
                let query = parse_query(query)?;
                let response = spotify_api_request(
                    &ctx,
                    method,
                    endpoint,
                    &body,
                    query.as_ref(),
                    uri.as_deref(),
                )
                .await?;
                self.output(&response)
            }
            Commands::AllItems {
                property,
                method,
                endpoint,
                query,
                body,
            } => {
                let body = parse_body(body.as_deref())?;
                let query = parse_query(query)?;
                let items = spotify_api_request_all_items(
                    &ctx,
                    property,
                    method,
                    endpoint,
                    &body,
                    query.as_ref(),
                )
                .await?;
                info!("Fetched {} '{}' items from {}", items.len(), property, endpoint);
                self.output(&JsonValue::Array(items))
            }
        }
    }

    /// Load the config file, or defaults when none is given
    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => ClientConfig::from_file(path),
            None => Ok(ClientConfig::default()),
        }
    }

    /// Wire credential store, HTTP client and base URL together
    fn build_context(&self) -> Result<ExecutionContext> {
        let config = self.load_config()?;

        let store: Arc<dyn CredentialStore> = if let Some(token) = &self.cli.access_token {
            debug!("Using access token from command line/environment");
            Arc::new(InMemoryCredentialStore::with_entry(
                CREDENTIAL_TYPE,
                OAuth2Credentials::from_access_token(token.clone()),
            ))
        } else if let Some(path) = self
            .cli
            .credentials
            .as_ref()
            .or(config.credentials_file.as_ref())
        {
            debug!("Using credentials file {}", path.display());
            Arc::new(FileCredentialStore::new(path))
        } else {
            // Calls fail with "No credentials got returned!"
            Arc::new(InMemoryCredentialStore::new())
        };

        let client = OAuth2HttpClient::with_config(config.http_client_config(), store.clone())?;
        let base_url = self
            .cli
            .base_url
            .clone()
            .unwrap_or_else(|| config.base_url.clone());

        Ok(ExecutionContext::new(store, Arc::new(client)).with_base_url(base_url))
    }

    /// Print a result to stdout
    fn output(&self, value: &JsonValue) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

/// Parse an optional JSON body; no body means an empty object
pub fn parse_body(body: Option<&str>) -> Result<JsonValue> {
    match body {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(JsonValue::Object(JsonObject::new())),
    }
}

/// Parse `KEY=VALUE` pairs into a query object. Repeated keys are joined with `,`.
pub fn parse_query(pairs: &[String]) -> Result<Option<JsonObject>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut query = JsonObject::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::config(format!("Query parameter '{pair}' is not KEY=VALUE")))?;

        let joined = match query.get(key).and_then(JsonValue::as_str) {
            Some(existing) => format!("{existing},{value}"),
            None => value.to_string(),
        };
        query.insert(key.to_string(), JsonValue::String(joined));
    }

    Ok(Some(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[test]
    fn test_parse_query() {
        assert!(parse_query(&[]).unwrap().is_none());

        let query = parse_query(&[
            "limit=50".to_string(),
            "ids=a".to_string(),
            "ids=b".to_string(),
            "q=artist:x=y".to_string(),
        ])
        .unwrap()
        .unwrap();

        assert_eq!(query["limit"], "50");
        assert_eq!(query["ids"], "a,b");
        assert_eq!(query["q"], "artist:x=y");

        let err = parse_query(&["broken".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(None).unwrap(), json!({}));
        assert_eq!(
            parse_body(Some(r#"{"ids": ["1"]}"#)).unwrap(),
            json!({"ids": ["1"]})
        );
        assert!(matches!(
            parse_body(Some("{nope")),
            Err(Error::JsonParse(_))
        ));
    }

    #[test]
    fn test_cli_parses_all_items() {
        let cli = Cli::try_parse_from([
            "spotify-connector",
            "--access-token",
            "abc",
            "all-items",
            "--endpoint",
            "/me/playlists",
            "-q",
            "limit=50",
        ])
        .unwrap();

        assert_eq!(cli.access_token.as_deref(), Some("abc"));
        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::AllItems {
                property,
                method,
                endpoint,
                query,
                body,
            } => {
                assert_eq!(property, "items");
                assert_eq!(method, "GET");
                assert_eq!(endpoint, "/me/playlists");
                assert_eq!(query, vec!["limit=50".to_string()]);
                assert!(body.is_none());
            }
            other => panic!("Expected AllItems, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_request() {
        let cli = Cli::try_parse_from([
            "spotify-connector",
            "request",
            "-X",
            "PUT",
            "--endpoint",
            "/me/tracks",
            "--body",
            r#"{"ids": ["1"]}"#,
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Request { ref method, .. } if method == "PUT"
        ));
    }

    #[test]
    fn test_cli_requires_endpoint_for_all_items() {
        let result = Cli::try_parse_from(["spotify-connector", "all-items"]);
        assert!(result.is_err());
    }
}
