use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::hash::{digest_eq, get_hash};
use crate::model::ActorId;

use super::TokenValidator;

/// Validates tokens against a fixed table of SHA-256 digests, one per actor.
///
/// Only digests are kept, so the table can live in a config file.
pub struct StaticTokenValidator {
    digests: Vec<(ActorId, String)>,
}

impl StaticTokenValidator {
    /// `digests` maps actor id to the hex digest of its token.
    pub fn new(digests: &HashMap<String, String>) -> Self {
        let mut digests: Vec<_> = digests
            .iter()
            .map(|(id, digest)| (ActorId::new(id.as_str()), digest.to_lowercase()))
            .collect();
        digests.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        Self { digests }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate_token(&self, token: &str) -> Result<ActorId> {
        if token.is_empty() {
            bail!("empty token");
        }
        let hash = get_hash(token.as_bytes());
        // Every entry is compared, matched or not.
        let mut found = None;
        for (id, digest) in self.digests.iter() {
            if digest_eq(digest, &hash) && found.is_none() {
                found = Some(id.clone());
            }
        }
        match found {
            Some(id) => Ok(id),
            None => bail!("invalid token"),
        }
    }
}
