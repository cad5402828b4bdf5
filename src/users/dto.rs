use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;

/// Profile as shown to anyone; never includes the password hash.
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            image_url: u.image_url,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub password: Option<String>,
}
