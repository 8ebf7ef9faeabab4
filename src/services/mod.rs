pub mod users;

pub use users::{ensure_bootstrap_user, register_user, NewUser, UserServiceError};
