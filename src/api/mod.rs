//! Basecamp 3 REST API access

pub mod client;
pub mod pagination;
pub mod resources;

pub use client::{ApiClient, ApiResponse, BASE_URL, USER_AGENT};
pub use pagination::{NextPage, Page, PageRequest, PageStyle, parse_link_header};
pub use resources::Account;
