//! In-process stand-in for Postgres used by the test suite. One lock
//! guards both tables, so uniqueness checks and inserts are atomic the
//! way a unique index makes them.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    db::{RepoError, RepoResult},
    posts::{
        repo::PostRepo,
        repo_types::{AuthorInfo, Post, PostFilter, PostUpdate, PostWithAuthor},
    },
    users::{
        repo::UserRepo,
        repo_types::{User, UserUpdate},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store lock poisoned")
    }

    /// Drops a user row without touching their posts, leaving orphans.
    pub fn remove_user(&self, id: Uuid) {
        self.lock().users.retain(|u| u.id != id);
    }

    /// Joined view in listing order; posts without an author are skipped.
    fn joined(tables: &Tables, filter: &PostFilter) -> Vec<PostWithAuthor> {
        let mut out: Vec<PostWithAuthor> = tables
            .posts
            .iter()
            .filter(|p| filter.author_id.map_or(true, |a| a == p.author_id))
            .filter_map(|p| {
                let author = tables.users.iter().find(|u| u.id == p.author_id)?;
                Some(PostWithAuthor {
                    post: p.clone(),
                    author: AuthorInfo {
                        username: author.username.clone(),
                        email: author.email.clone(),
                        image_url: author.image_url.clone(),
                    },
                })
            })
            .collect();
        out.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then_with(|| b.post.id.cmp(&a.post.id))
        });
        out
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> RepoResult<User> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(RepoError::Conflict("email"));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            username: None,
            image_url: None,
            role: "user".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_fields(&self, id: Uuid, update: &UserUpdate) -> RepoResult<Option<User>> {
        let mut tables = self.lock();
        if let Some(email) = &update.email {
            if tables.users.iter().any(|u| &u.email == email && u.id != id) {
                return Err(RepoError::Conflict("email"));
            }
        }
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            if let Some(v) = &update.email {
                user.email = v.clone();
            }
            if let Some(v) = &update.username {
                user.username = Some(v.clone());
            }
            if let Some(v) = &update.image_url {
                user.image_url = Some(v.clone());
            }
            if let Some(v) = &update.password_hash {
                user.password_hash = v.clone();
            }
            user.clone()
        }))
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>> {
        Ok(self.lock().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, author_id: Uuid, title: &str, content: &str) -> RepoResult<Post> {
        let now = OffsetDateTime::now_utc();
        let post = Post {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            created_at: now,
            updated_at: now,
        };
        self.lock().posts.push(post.clone());
        Ok(post)
    }

    async fn update_fields(&self, id: Uuid, update: &PostUpdate) -> RepoResult<Option<Post>> {
        let mut tables = self.lock();
        Ok(tables.posts.iter_mut().find(|p| p.id == id).map(|post| {
            if let Some(t) = &update.title {
                post.title = t.clone();
            }
            if let Some(c) = &update.content {
                post.content = c.clone();
            }
            post.updated_at = OffsetDateTime::now_utc();
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.lock();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        Ok(tables.posts.len() != before)
    }

    async fn list_with_authors(
        &self,
        filter: &PostFilter,
        skip: i64,
        limit: i64,
    ) -> RepoResult<Vec<PostWithAuthor>> {
        let tables = self.lock();
        Ok(Self::joined(&tables, filter)
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &PostFilter) -> RepoResult<i64> {
        let tables = self.lock();
        Ok(Self::joined(&tables, filter).len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::default();
        UserRepo::insert(&store, "a@x.com", "h").await.unwrap();
        let err = UserRepo::insert(&store, "a@x.com", "h").await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict("email")));
    }

    #[tokio::test]
    async fn orphaned_posts_vanish_from_window_and_count() {
        let store = MemoryStore::default();
        let keep = UserRepo::insert(&store, "keep@x.com", "h").await.unwrap();
        let gone = UserRepo::insert(&store, "gone@x.com", "h").await.unwrap();
        PostRepo::insert(&store, keep.id, "a", "a").await.unwrap();
        PostRepo::insert(&store, gone.id, "b", "b").await.unwrap();
        store.remove_user(gone.id);

        let all = PostFilter::default();
        assert_eq!(store.count(&all).await.unwrap(), 1);
        let page = store.list_with_authors(&all, 0, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].author.email, "keep@x.com");
    }
}
