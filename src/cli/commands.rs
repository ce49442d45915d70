//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spotify Web API helper CLI
#[derive(Parser, Debug)]
#[command(name = "spotify-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Credentials file (JSON or YAML, keyed by credential type)
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Access token used instead of a credentials file
    #[arg(long, global = true, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make a single API request
    Request {
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Endpoint path appended to the base URL (e.g. /me)
        #[arg(short, long, default_value = "")]
        endpoint: String,

        /// Query parameter (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// Full URL, used instead of base URL + endpoint
        #[arg(long)]
        uri: Option<String>,
    },

    /// Fetch every page of a list endpoint
    AllItems {
        /// Field holding the items on each page
        #[arg(short, long, default_value = "items")]
        property: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Endpoint path appended to the base URL (e.g. /me/playlists)
        #[arg(short, long)]
        endpoint: String,

        /// Query parameter for the first page (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
