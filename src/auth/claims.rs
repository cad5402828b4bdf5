use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verified identity carried by a session token. Closed on purpose: the
/// user id plus the envelope timestamps, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,  // user ID
    pub iat: i64,  // issued at (unix timestamp)
    pub exp: i64,  // expires at (unix timestamp)
}
