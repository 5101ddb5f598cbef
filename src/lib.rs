//! Basecamp CLI - command-line client for the Basecamp 3 API
//!
//! OAuth2 sign-in against Launchpad with tokens kept in the OS keychain, a
//! paginating REST client, and JSON/table/plain rendering of the results.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;

/// Basecamp CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name
pub const APP_NAME: &str = "basecamp";
