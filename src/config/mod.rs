//! Configuration management for the Basecamp CLI

pub mod app_config;
pub mod store;

pub use app_config::*;
pub use store::*;
