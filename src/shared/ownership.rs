//! Ownership predicate shared by every user-scoped record.
//!
//! Stores fetch records by id only; the predicate decides visibility before
//! anything is returned or mutated. A record that exists but fails the
//! predicate is reported exactly like a missing one.

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// A record scoped to a single user
pub trait Owned {
    /// Id of the user the record is scoped to (owner or share recipient)
    fn owner_ref(&self) -> Uuid;

    fn belongs_to(&self, user: &AuthenticatedUser) -> bool {
        self.owner_ref() == user.id
    }
}

/// Keep `record` only if it belongs to `user`, otherwise report `what` as not found
pub fn ensure_owned<T: Owned>(record: Option<T>, user: &AuthenticatedUser, what: &str) -> Result<T> {
    record
        .filter(|r| r.belongs_to(user))
        .ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        owner: Uuid,
    }

    impl Owned for Note {
        fn owner_ref(&self) -> Uuid {
            self.owner
        }
    }

    fn user(id: Uuid) -> AuthenticatedUser {
        AuthenticatedUser {
            id,
            username: "someone".to_string(),
        }
    }

    #[test]
    fn test_ensure_owned_returns_own_record() {
        let id = Uuid::new_v4();
        let note = ensure_owned(Some(Note { owner: id }), &user(id), "Note").unwrap();
        assert_eq!(note.owner, id);
    }

    #[test]
    fn test_foreign_and_missing_records_look_the_same() {
        let foreign = ensure_owned(
            Some(Note {
                owner: Uuid::new_v4(),
            }),
            &user(Uuid::new_v4()),
            "Note",
        )
        .err()
        .map(|e| e.to_string());
        let missing = ensure_owned::<Note>(None, &user(Uuid::new_v4()), "Note")
            .err()
            .map(|e| e.to_string());

        assert_eq!(foreign, missing);
        assert_eq!(foreign.as_deref(), Some("Not found: Note not found"));
    }
}
