//! Pure list operations backing every mutation of the user list.
//!
//! The mirror's intended invariant is that its content equals the result of
//! applying these operations, in order, to the initially loaded list. Keeping
//! them as plain functions keeps that property testable without any IO.

use crate::models::User;

/// Append a newly created record to the end of the list.
pub fn append(users: &mut Vec<User>, user: User) {
    users.push(user);
}

/// Replace the record with a matching identifier. Returns false if no record
/// matched (the list is left unchanged).
pub fn replace_by_id(users: &mut [User], user: User) -> bool {
    match users.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => {
            *existing = user;
            true
        }
        None => false,
    }
}

/// Remove the record with the given identifier. Removing an identifier that
/// is not present is a no-op. Returns whether a record was removed.
pub fn remove_by_id(users: &mut Vec<User>, id: i64) -> bool {
    let before = users.len();
    users.retain(|u| u.id != id);
    users.len() != before
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserDraft;

    fn user(id: i64, name: &str) -> User {
        UserDraft {
            name: name.to_string(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            website: "example.com".to_string(),
        }
        .into_user(id)
    }

    #[test]
    fn test_append_preserves_order() {
        let mut users = Vec::new();
        append(&mut users, user(1, "Ann"));
        append(&mut users, user(2, "Bob"));
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_replace_by_id_keeps_position() {
        let mut users = vec![user(1, "Ann"), user(2, "Bob"), user(3, "Cal")];
        assert!(replace_by_id(&mut users, user(2, "Bobby")));
        assert_eq!(users[1].name, "Bobby");
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn test_replace_missing_id_is_noop() {
        let mut users = vec![user(1, "Ann")];
        assert!(!replace_by_id(&mut users, user(9, "Zed")));
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ann");
    }

    #[test]
    fn test_remove_by_id() {
        let mut users = vec![user(1, "Ann"), user(2, "Bob")];
        assert!(remove_by_id(&mut users, 1));
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, 2);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut users = vec![user(1, "Ann")];
        assert!(!remove_by_id(&mut users, 42));
        assert_eq!(users.len(), 1);
    }
}
