use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub email: String,                // unique, stored lowercased
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub role: String,                 // "user" unless set otherwise
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,   // creation timestamp
}

/// Sparse profile update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.image_url.is_none()
            && self.password_hash.is_none()
    }
}

#[cfg(test)]
impl User {
    pub fn fixture(email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: String::new(),
            username: None,
            image_url: None,
            role: "user".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
