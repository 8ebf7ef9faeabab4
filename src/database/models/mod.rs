pub mod game;
pub mod user;

pub use game::{Game, GameUpdate, StoredGame};
pub use user::{User, UserInDb};
