//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Short user representation embedded in event views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserShortView {
    pub id: i64,
    pub name: String,
}

impl From<User> for UserShortView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
}
