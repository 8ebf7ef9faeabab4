// Public handlers - no authentication required
pub mod health;
pub mod token;

pub use health::{health, root};
pub use token::login;
