use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::{error, warn};

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Never fails: a digest that does not parse simply does not match.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

lazy_static! {
    // Verified against when the email is unknown, so that path costs the same.
    static ref DUMMY_HASH: Option<String> = hash_password("quillpost-timing-pad").ok();
}

/// Hashes on the blocking pool so request tasks keep moving.
pub async fn hash(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("password hashing task panicked")?
}

pub async fn verify(plain: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .unwrap_or(false)
}

/// Burns roughly one verification worth of CPU and always reports no match.
pub async fn verify_dummy(plain: String) -> bool {
    tokio::task::spawn_blocking(move || {
        if let Some(h) = DUMMY_HASH.as_deref() {
            let _ = verify_password(&plain, h);
        }
    })
    .await
    .ok();
    false
}
