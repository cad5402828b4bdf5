use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Forbidden,
}

/// Only the owner may mutate an owned resource. Callers without a session
/// never reach this point; they are rejected as unauthenticated first.
pub fn authorize(caller_id: Uuid, owner_id: Uuid) -> Verdict {
    if caller_id == owner_id {
        Verdict::Allow
    } else {
        Verdict::Forbidden
    }
}

pub fn ensure_owner(caller_id: Uuid, owner_id: Uuid) -> Result<(), ApiError> {
    match authorize(caller_id, owner_id) {
        Verdict::Allow => Ok(()),
        Verdict::Forbidden => Err(ApiError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_allowed() {
        let a = Uuid::new_v4();
        assert_eq!(authorize(a, a), Verdict::Allow);
        assert!(ensure_owner(a, a).is_ok());
    }

    #[test]
    fn anyone_else_is_forbidden() {
        let a = Uuid::new_v4();
        for _ in 0..16 {
            let b = Uuid::new_v4();
            assert_eq!(authorize(a, b), Verdict::Forbidden);
            assert_eq!(authorize(b, a), Verdict::Forbidden);
        }
        assert!(matches!(
            ensure_owner(a, Uuid::new_v4()),
            Err(ApiError::Forbidden)
        ));
    }
}
