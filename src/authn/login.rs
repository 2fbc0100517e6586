use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};

use crate::context::Context;
use crate::directory::Directory;

use super::{Authenticator, AuthnResponse};

/// Logs the actor in when a form with username and password was POSTed to
/// any URL, e.g.:
///
/// ```html
/// <form method="post">
///     <input name="username" />
///     <input name="password" type="password" />
///     <input type="submit" />
/// </form>
/// ```
///
/// A successful login is handed to the nodes after this one (typically a
/// [`super::SessionAuthenticator`]) so later requests stay authenticated.
pub struct LoginAuthenticator {
    directory: Arc<dyn Directory>,
    username_field: String,
    password_field: String,
}

impl LoginAuthenticator {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self::with_fields(directory, "username", "password")
    }

    pub fn with_fields(
        directory: Arc<dyn Directory>,
        username_field: &str,
        password_field: &str,
    ) -> Self {
        Self {
            directory,
            username_field: username_field.to_string(),
            password_field: password_field.to_string(),
        }
    }
}

#[async_trait]
impl Authenticator for LoginAuthenticator {
    fn name(&self) -> &'static str {
        "login"
    }

    async fn retrieve(&self, ctx: &Context) -> Result<AuthnResponse> {
        let req = match ctx.request() {
            Some(req) if req.is_post() => req,
            _ => return Ok(AuthnResponse::Continue),
        };

        let username = match req.form_value(&self.username_field) {
            Some(username) => username,
            None => return Ok(AuthnResponse::Continue),
        };
        let password = match req.form_value(&self.password_field) {
            Some(password) => password,
            None => return Ok(AuthnResponse::Continue),
        };

        match self.directory.verify(username, password).await? {
            Some(actor) => {
                info!("Login succeeded for '{username}' as actor '{}'", actor.id);
                Ok(AuthnResponse::Login(actor))
            }
            None => {
                debug!("Login rejected for '{username}'");
                Ok(AuthnResponse::Continue)
            }
        }
    }
}
