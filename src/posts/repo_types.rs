use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid, // set at creation, never reassigned
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Sparse post update. The owner is deliberately not representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Filter shared by the window read and the count read of a listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
        }
    }
}

/// Flat row of a post joined to its author.
#[derive(Debug, FromRow)]
pub struct PostWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_username: Option<String>,
    pub author_email: String,
    pub author_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorInfo {
    pub username: Option<String>,
    pub email: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorInfo,
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(r: PostWithAuthorRow) -> Self {
        Self {
            post: Post {
                id: r.id,
                title: r.title,
                content: r.content,
                author_id: r.author_id,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            author: AuthorInfo {
                username: r.author_username,
                email: r.author_email,
                image_url: r.author_image_url,
            },
        }
    }
}
