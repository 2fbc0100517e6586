use anyhow::Result;
use async_trait::async_trait;

use crate::context::Context;

use super::{Authenticator, AuthnResponse};

/// Terminates every authentication chain. Never resolves an actor and
/// ignores `store`.
pub struct NullAuthenticator;

impl NullAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for NullAuthenticator {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn retrieve(&self, _ctx: &Context) -> Result<AuthnResponse> {
        Ok(AuthnResponse::Continue)
    }
}
