pub mod digest;

#[cfg(test)]
pub mod simple;

use anyhow::Result;

use crate::model::ActorId;

/// Maps a bearer token to the actor it was issued for.
pub trait TokenValidator: Send + Sync {
    fn validate_token(&self, token: &str) -> Result<ActorId>;
}
