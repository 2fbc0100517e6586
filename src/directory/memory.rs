use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::hash::{digest_eq, generate_salt, get_password_hash, SALT_LENGTH};
use crate::model::{Actor, ActorId};

use super::Directory;

struct Credentials {
    id: ActorId,
    hash: String,
    salt: String,
}

/// A directory held in memory. Filled at setup time, read-only afterwards.
///
/// Passwords are kept as salted SHA-256 digests only.
#[derive(Default)]
pub struct MemoryDirectory {
    actors: HashMap<ActorId, Actor>,
    logins: HashMap<String, Credentials>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor that can only be resolved by id (via session or token).
    pub fn insert(&mut self, actor: Actor) -> Result<()> {
        if self.actors.contains_key(&actor.id) {
            bail!("actor '{}' already exists", actor.id);
        }
        self.actors.insert(actor.id.clone(), actor);
        Ok(())
    }

    /// Adds an actor that can also log in with `username` and `password`.
    pub fn insert_with_login(&mut self, actor: Actor, username: &str, password: &str) -> Result<()> {
        if username.is_empty() {
            bail!("username cannot be empty");
        }
        if self.logins.contains_key(username) {
            bail!("username '{username}' already exists");
        }
        let id = actor.id.clone();
        self.insert(actor)?;
        let salt = generate_salt(SALT_LENGTH);
        self.logins.insert(
            username.to_string(),
            Credentials {
                id,
                hash: get_password_hash(password, &salt),
                salt,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn get(&self, id: &ActorId) -> Result<Option<Actor>> {
        Ok(self.actors.get(id).cloned())
    }

    async fn verify(&self, username: &str, password: &str) -> Result<Option<Actor>> {
        let creds = match self.logins.get(username) {
            Some(creds) => creds,
            None => return Ok(None),
        };
        if !digest_eq(&creds.hash, &get_password_hash(password, &creds.salt)) {
            return Ok(None);
        }
        Ok(self.actors.get(&creds.id).cloned())
    }
}
