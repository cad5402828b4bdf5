use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Post, PostFilter, PostUpdate, PostWithAuthor, PostWithAuthorRow};
use crate::db::RepoResult;

const POST_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

/// Content store for posts. Listings join each post to exactly one author;
/// the window and the count apply the same filter and join.
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>>;
    async fn insert(&self, author_id: Uuid, title: &str, content: &str) -> RepoResult<Post>;
    /// Refreshes `updated_at`. Returns `None` when the post is gone.
    async fn update_fields(&self, id: Uuid, update: &PostUpdate) -> RepoResult<Option<Post>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
    /// Newest first, ties broken by id.
    async fn list_with_authors(
        &self,
        filter: &PostFilter,
        skip: i64,
        limit: i64,
    ) -> RepoResult<Vec<PostWithAuthor>>;
    async fn count(&self, filter: &PostFilter) -> RepoResult<i64>;
}

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find post by id")?;
        Ok(post)
    }

    async fn insert(&self, author_id: Uuid, title: &str, content: &str) -> RepoResult<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, title, content, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(&self.db)
        .await
        .context("insert post")?;
        Ok(post)
    }

    async fn update_fields(&self, id: Uuid, update: &PostUpdate) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
               SET title      = COALESCE($2, title),
                   content    = COALESCE($3, content),
                   updated_at = now()
             WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.content.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update post")?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete post")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_with_authors(
        &self,
        filter: &PostFilter,
        skip: i64,
        limit: i64,
    ) -> RepoResult<Vec<PostWithAuthor>> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"
            SELECT p.id, p.title, p.content, p.author_id, p.created_at, p.updated_at,
                   u.username  AS author_username,
                   u.email     AS author_email,
                   u.image_url AS author_image_url
              FROM posts p
              JOIN users u ON u.id = p.author_id
             WHERE ($1::uuid IS NULL OR p.author_id = $1)
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.author_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.db)
        .await
        .context("list posts with authors")?;
        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn count(&self, filter: &PostFilter) -> RepoResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
              FROM posts p
              JOIN users u ON u.id = p.author_id
             WHERE ($1::uuid IS NULL OR p.author_id = $1)
            "#,
        )
        .bind(filter.author_id)
        .fetch_one(&self.db)
        .await
        .context("count posts")?;
        Ok(total)
    }
}
