//! Error handling for the Basecamp CLI

pub mod types;

pub use types::*;
