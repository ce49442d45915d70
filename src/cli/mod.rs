//! CLI module
//!
//! Command-line access to the Spotify helpers.
//!
//! # Commands
//!
//! - `request` - Make a single authenticated API call
//! - `all-items` - Follow `next` links and print every item

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{parse_body, parse_query, Runner};
