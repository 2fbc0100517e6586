use anyhow::{Context as _, Result};
use log::{debug, warn};

use crate::context::Context;
use crate::model::Actor;

use super::null::NullAuthenticator;
use super::{Authenticator, AuthnResponse};

/// Outcome of [`ChainAuthenticator::retrieve`].
#[derive(Debug, Default)]
pub struct Resolution {
    /// The resolved actor, `None` when no node could resolve one.
    pub actor: Option<Actor>,
    /// Set when an actor logged in but storing it in the nodes after the
    /// login node failed.
    pub store_error: Option<anyhow::Error>,
}

/// An ordered list of authenticators, always terminated by a
/// [`NullAuthenticator`].
///
/// Nodes are consulted strictly in order; node *i* is never asked before
/// node *i-1* has declined, and the first node that resolves an actor wins.
pub struct ChainAuthenticator {
    authenticators: Vec<Box<dyn Authenticator>>,
}

impl ChainAuthenticator {
    pub fn new(mut authenticators: Vec<Box<dyn Authenticator>>) -> Self {
        authenticators.push(Box::new(NullAuthenticator::new()));
        Self { authenticators }
    }

    /// Resolves the current actor.
    pub async fn retrieve(&self, ctx: &Context) -> Resolution {
        for (idx, authenticator) in self.authenticators.iter().enumerate() {
            let resp = match authenticator.retrieve(ctx).await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(
                        "Authenticator '{}' could not resolve actor, delegating: {e:#}",
                        authenticator.name()
                    );
                    continue;
                }
            };

            match resp {
                AuthnResponse::Ok(actor) => {
                    debug!(
                        "Actor '{}' resolved by authenticator '{}'",
                        actor.id,
                        authenticator.name()
                    );
                    return Resolution {
                        actor: Some(actor),
                        store_error: None,
                    };
                }
                AuthnResponse::Login(actor) => {
                    debug!(
                        "Actor '{}' logged in by authenticator '{}'",
                        actor.id,
                        authenticator.name()
                    );
                    let store_error = self
                        .store_from(idx + 1, ctx, Some(&actor))
                        .await
                        .with_context(|| format!("store logged in actor '{}'", actor.id))
                        .err();
                    return Resolution {
                        actor: Some(actor),
                        store_error,
                    };
                }
                AuthnResponse::Continue => continue,
            }
        }

        Resolution::default()
    }

    /// Propagates `actor` to every node that persists actors, in chain order.
    pub async fn store(&self, ctx: &Context, actor: Option<&Actor>) -> Result<()> {
        self.store_from(0, ctx, actor).await
    }

    async fn store_from(&self, start: usize, ctx: &Context, actor: Option<&Actor>) -> Result<()> {
        for authenticator in self.authenticators.iter().skip(start) {
            authenticator
                .store(ctx, actor)
                .await
                .with_context(|| format!("store actor in authenticator '{}'", authenticator.name()))?;
        }
        Ok(())
    }

    /// Node names in consultation order, the terminating `null` included.
    pub fn names(&self) -> Vec<&'static str> {
        self.authenticators.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.authenticators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }
}
