use std::sync::Arc;

use anyhow::{bail, Result};
use log::{info, warn};

use crate::directory::Directory;

use super::bearer_token::BearerTokenAuthenticator;
use super::chain::ChainAuthenticator;
use super::config::{AuthenticatorConfig, PayloadKind};
use super::login::LoginAuthenticator;
use super::session::{SessionAuthenticator, SessionPayload};
use super::token::digest::StaticTokenValidator;
use super::Authenticator;

/// Builds authentication chains from configuration, keeping the
/// configured order.
pub struct AuthnFactory;

impl AuthnFactory {
    pub fn new() -> Self {
        Self
    }

    /// Builds the chain for `cfgs`, which must already be completed.
    ///
    /// `directory` is required by every node except a session node with a
    /// JSON payload.
    pub fn build_authenticator(
        &self,
        cfgs: &[AuthenticatorConfig],
        directory: Option<Arc<dyn Directory>>,
    ) -> Result<ChainAuthenticator> {
        let mut authenticators: Vec<Box<dyn Authenticator>> = Vec::with_capacity(cfgs.len());
        for cfg in cfgs {
            let authenticator = self.build_node(cfg, directory.as_ref())?;
            authenticators.push(authenticator);
        }

        let chain = ChainAuthenticator::new(authenticators);
        if cfgs.is_empty() {
            warn!("No authenticator configured, every request will be anonymous");
        }
        info!("Authentication chain: {}", chain.names().join(" -> "));
        Ok(chain)
    }

    fn build_node(
        &self,
        cfg: &AuthenticatorConfig,
        directory: Option<&Arc<dyn Directory>>,
    ) -> Result<Box<dyn Authenticator>> {
        let require_directory = || -> Result<Arc<dyn Directory>> {
            match directory {
                Some(directory) => Ok(directory.clone()),
                None => bail!("authenticator '{}' requires an actor directory", cfg.name()),
            }
        };

        let authenticator: Box<dyn Authenticator> = match cfg {
            AuthenticatorConfig::Login(cfg) => Box::new(LoginAuthenticator::with_fields(
                require_directory()?,
                &cfg.username_field,
                &cfg.password_field,
            )),
            AuthenticatorConfig::Session(cfg) => {
                let payload = match cfg.payload {
                    PayloadKind::Directory => SessionPayload::Directory(require_directory()?),
                    PayloadKind::Json => SessionPayload::Json,
                };
                Box::new(SessionAuthenticator::with_key(&cfg.session_key, payload))
            }
            AuthenticatorConfig::Token(cfg) => {
                let validator = StaticTokenValidator::new(&cfg.tokens);
                Box::new(BearerTokenAuthenticator::new(
                    validator,
                    require_directory()?,
                ))
            }
        };
        Ok(authenticator)
    }
}
