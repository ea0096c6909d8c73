//! User domain model.
//!
//! # Invariants
//! - `id` is `None` until the user is saved through a repository.
//! - `(name, email)` is a lookup key only; duplicates are allowed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a persisted user.
pub type UserId = Uuid;

/// A person who owns auctions and places bids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: Option<UserId>,
    pub name: String,
    pub email: String,
}

impl User {
    /// Creates an unsaved user.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Rebuilds a persisted user from storage.
    pub fn with_id(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: UserId) {
        self.id = Some(id);
    }

    /// Returns whether both values denote the same persisted user.
    ///
    /// Unsaved users are never the same entity as anything else.
    pub fn is_same_entity(&self, other: &User) -> bool {
        matches!((self.id, other.id), (Some(left), Some(right)) if left == right)
    }
}
