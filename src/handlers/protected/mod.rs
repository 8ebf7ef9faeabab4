// Protected handlers - bearer token required (see middleware::require_bearer)
pub mod games;
pub mod users;

pub use users::me as users_me;
