use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

/// Failure modes shared by every repository.
#[derive(Error, Debug)]
pub enum RepoError {
    /// A unique constraint rejected the write; carries the offending field.
    #[error("duplicate {0}")]
    Conflict(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Maps a failed write, turning SQLSTATE 23505 into [`RepoError::Conflict`].
pub(crate) fn map_write_err(e: sqlx::Error, field: &'static str, what: &'static str) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return RepoError::Conflict(field);
        }
    }
    RepoError::Other(anyhow::Error::new(e).context(what))
}
