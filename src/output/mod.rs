//! Result rendering

pub mod formatter;
pub mod pager;

pub use formatter::{OutputFormat, format_output};
pub use pager::Pager;
