use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::context::Context;
use crate::directory::Directory;

use super::token::TokenValidator;
use super::{Authenticator, AuthnResponse};

/// Resolves actors from an `Authorization: Bearer <token>` header. Meant for
/// cron jobs and workers, so a resolved token never starts a session.
pub struct BearerTokenAuthenticator<T: TokenValidator> {
    validator: T,
    directory: Arc<dyn Directory>,
}

impl<T: TokenValidator> BearerTokenAuthenticator<T> {
    pub fn new(validator: T, directory: Arc<dyn Directory>) -> Self {
        Self {
            validator,
            directory,
        }
    }
}

#[async_trait]
impl<T: TokenValidator> Authenticator for BearerTokenAuthenticator<T> {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn retrieve(&self, ctx: &Context) -> Result<AuthnResponse> {
        let auth = match ctx.request().and_then(|req| req.header("Authorization")) {
            Some(auth) => auth.trim(),
            None => return Ok(AuthnResponse::Continue),
        };
        if auth.is_empty() {
            return Ok(AuthnResponse::Continue);
        }

        let mut iter = auth.split_whitespace();
        match iter.next() {
            Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
            _ => return Ok(AuthnResponse::Continue),
        }
        let token = match iter.next() {
            Some(token) => token,
            None => return Ok(AuthnResponse::Continue),
        };

        let id = match self.validator.validate_token(token) {
            Ok(id) => id,
            Err(e) => {
                debug!("Rejected bearer token: {e:#}");
                return Ok(AuthnResponse::Continue);
            }
        };

        match self.directory.get(&id).await? {
            Some(actor) => Ok(AuthnResponse::Ok(actor)),
            None => {
                debug!("Bearer token refers to unknown actor '{id}'");
                Ok(AuthnResponse::Continue)
            }
        }
    }
}
