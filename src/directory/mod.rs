mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{Actor, ActorId};

pub use memory::MemoryDirectory;

/// Where actors live. Backed by the application's user management; this
/// crate only reads from it.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Loads an actor by id. `None` if the id is unknown (e.g. a stale session).
    async fn get(&self, id: &ActorId) -> Result<Option<Actor>>;

    /// Checks submitted credentials. `None` if the user is unknown or the
    /// password does not match.
    async fn verify(&self, username: &str, password: &str) -> Result<Option<Actor>>;
}
