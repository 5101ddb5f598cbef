//! Authentication: OAuth2 flow, token storage and the redirect listener

pub mod callback;
pub mod oauth;
pub mod token_store;

pub use callback::{CallbackListener, listener_target};
pub use oauth::{Authenticator, extract_code};
pub use token_store::{
    KeyringTokenStore, MemoryTokenStore, TokenStore, clear_slots, resolve_slot, usable_token,
};
