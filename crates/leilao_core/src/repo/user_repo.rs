//! User repository.
//!
//! # Invariants
//! - No uniqueness check on `(name, email)`; duplicates are accepted.
//! - Lookup by name and email returns the earliest inserted match.
//! - Deleting a user removes the bids that user placed.
//! - Deleting a user who still owns an auction is refused by the schema and
//!   surfaces as `RepoError::Storage`.

use crate::gateway::{RepoResult, StorageGateway, UserCriteria};
use crate::model::user::{User, UserId};
use log::debug;

/// Persistence and lookup of users through a storage gateway.
pub struct UserRepository<'g, G: StorageGateway<User>> {
    gateway: &'g G,
}

impl<'g, G: StorageGateway<User>> UserRepository<'g, G> {
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Persists a new user and stores the assigned id on it.
    pub fn save(&self, user: &mut User) -> RepoResult<UserId> {
        let id = self.gateway.insert(user)?;
        user.set_id(id);
        debug!("event=user_save module=repo status=ok");
        Ok(id)
    }

    /// Persists changed name/email of an already saved user.
    pub fn update(&self, user: &User) -> RepoResult<()> {
        self.gateway.update(user)
    }

    pub fn delete(&self, user: &User) -> RepoResult<()> {
        self.gateway.delete(user)?;
        debug!("event=user_delete module=repo status=ok");
        Ok(())
    }

    pub fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.gateway.fetch_by_id(id)
    }

    /// Finds a user by exact name and email.
    pub fn find_by_name_and_email(&self, name: &str, email: &str) -> RepoResult<Option<User>> {
        self.gateway.fetch_first(&name_and_email(name, email))
    }

    /// Counts users sharing the exact name and email.
    pub fn count_by_name_and_email(&self, name: &str, email: &str) -> RepoResult<u64> {
        self.gateway.count(&name_and_email(name, email))
    }
}

fn name_and_email(name: &str, email: &str) -> UserCriteria {
    UserCriteria::NameAndEmail {
        name: name.to_string(),
        email: email.to_string(),
    }
}
