use serde::{Deserialize, Serialize};

/// User as exposed over HTTP. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// User document as stored in the `user` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInDb {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
    pub hashed_password: String,
}

impl UserInDb {
    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }
}

impl From<UserInDb> for User {
    fn from(user: UserInDb) -> Self {
        Self {
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            disabled: user.disabled,
        }
    }
}
