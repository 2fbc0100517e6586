pub mod config;

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::authn::factory::AuthnFactory;
use crate::authn::ChainAuthenticator;
use crate::authz::RuleSet;
use crate::config::CommonConfig;
use crate::directory::Directory;
use crate::error::AuthError;
use crate::model::GroupCatalog;

use self::config::AuthConfig;

/// The configured authentication chain and rule set, shared read-only by
/// every request.
pub struct AuthModule {
    authn: ChainAuthenticator,
    rules: RuleSet,
    groups: GroupCatalog,
}

impl AuthModule {
    pub fn new(authn: ChainAuthenticator, rules: RuleSet, groups: GroupCatalog) -> Self {
        Self {
            authn,
            rules,
            groups,
        }
    }

    #[inline]
    pub fn authenticator(&self) -> &ChainAuthenticator {
        &self.authn
    }

    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[inline]
    pub fn groups(&self) -> &GroupCatalog {
        &self.groups
    }
}

impl Default for AuthModule {
    /// A chain that never resolves an actor and no rules at all.
    fn default() -> Self {
        Self::new(
            ChainAuthenticator::new(Vec::new()),
            RuleSet::default(),
            GroupCatalog::default(),
        )
    }
}

/// Builds the [`AuthModule`] once at application startup.
pub struct AuthFactory<'a> {
    cfg: &'a AuthConfig,
    directory: Option<Arc<dyn Directory>>,
}

impl<'a> AuthFactory<'a> {
    pub fn new(cfg: &'a AuthConfig) -> Self {
        Self {
            cfg,
            directory: None,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Completes the config, validates the group catalog, builds the chain
    /// and pairs it with `rules`. Failures are reported as
    /// [`AuthError::Config`].
    ///
    /// Configs assembled in code get the same `authenticator` shorthand
    /// handling and digest checks as parsed ones.
    pub fn build(self, rules: RuleSet) -> Result<Arc<AuthModule>> {
        let mut cfg = self.cfg.clone();
        cfg.complete()
            .map_err(|e| AuthError::Config(format!("{e:#}")))?;

        let groups = GroupCatalog::build(&cfg.permissions, &cfg.groups)
            .map_err(|e| AuthError::Config(format!("{e:#}")))?;
        let authn = AuthnFactory::new()
            .build_authenticator(&cfg.authenticators, self.directory)
            .map_err(|e| AuthError::Config(format!("{e:#}")))?;

        info!(
            "Auth module ready with {} authenticator(s), {} rule(s), {} group(s)",
            authn.len(),
            rules.len(),
            groups.len()
        );
        Ok(Arc::new(AuthModule::new(authn, rules, groups)))
    }
}
