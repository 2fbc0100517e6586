mod bearer_token;
mod chain;
mod login;
mod null;
mod session;

pub mod config;
pub mod factory;
pub mod token;

use anyhow::Result;
use async_trait::async_trait;

use crate::context::Context;
use crate::model::Actor;

pub use bearer_token::BearerTokenAuthenticator;
pub use chain::{ChainAuthenticator, Resolution};
pub use login::LoginAuthenticator;
pub use null::NullAuthenticator;
pub use session::{SessionAuthenticator, SessionPayload};

/// One node of the authentication chain.
///
/// Nodes must not keep per-request state: a single instance serves every
/// concurrent request. Anything request-specific lives in the [`Context`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tries to determine the current actor. An error is treated by the
    /// chain like [`AuthnResponse::Continue`].
    async fn retrieve(&self, ctx: &Context) -> Result<AuthnResponse>;

    /// Notification that the current actor changed, so nodes that remember
    /// actors across requests can persist it. Opt-in: the default ignores it.
    async fn store(&self, _ctx: &Context, _actor: Option<&Actor>) -> Result<()> {
        Ok(())
    }
}

/// Possible responses from an authenticator.
#[derive(Debug, Clone)]
pub enum AuthnResponse {
    /// Actor resolved from state persisted by an earlier request
    Ok(Actor),
    /// Actor freshly authenticated; the nodes after this one are asked to store it
    Login(Actor),
    /// Defers the decision to the next authenticator in the chain
    Continue,
}
