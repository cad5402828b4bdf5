use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{User, UserUpdate};
use crate::db::{map_write_err, RepoResult};

const USER_COLUMNS: &str = "id, email, password_hash, username, image_url, role, created_at";

/// Credential store. `insert` and `update_fields` surface a duplicate
/// email as [`crate::db::RepoError::Conflict`] even when a prior lookup
/// said it was free.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn insert(&self, email: &str, password_hash: &str) -> RepoResult<User>;
    /// Returns `None` when no such user exists.
    async fn update_fields(&self, id: Uuid, update: &UserUpdate) -> RepoResult<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn insert(&self, email: &str, password_hash: &str) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_err(e, "email", "insert user"))
    }

    async fn update_fields(&self, id: Uuid, update: &UserUpdate) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email         = COALESCE($2, email),
                   username      = COALESCE($3, username),
                   image_url     = COALESCE($4, image_url),
                   password_hash = COALESCE($5, password_hash)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.email.as_deref())
        .bind(update.username.as_deref())
        .bind(update.image_url.as_deref())
        .bind(update.password_hash.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_err(e, "email", "update user"))
    }
}
