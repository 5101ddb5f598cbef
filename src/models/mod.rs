pub mod resources;
pub mod token;

pub use resources::*;
pub use token::*;
