mod request;
mod session;

use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};
use tokio::sync::Mutex;

use crate::authz::Subject;
use crate::error::AuthError;
use crate::factory::AuthModule;
use crate::model::Actor;

pub use request::Request;
pub use session::{MemorySession, Session};

enum ActorSlot {
    Unresolved,
    Resolved {
        initial: Option<Actor>,
        current: Option<Actor>,
    },
}

impl ActorSlot {
    fn is_changed(&self) -> bool {
        match self {
            Self::Unresolved => false,
            Self::Resolved { initial, current } => initial.as_ref().map(|a| &a.id)
                != current.as_ref().map(|a| &a.id),
        }
    }
}

/// Request-scoped state: the lazily resolved actor, the request view and
/// the session.
///
/// The actor is resolved through the authentication chain on first access
/// and cached for the rest of the request. Nothing request-specific is ever
/// written back into the shared [`AuthModule`].
pub struct Context {
    module: Arc<AuthModule>,
    request: Option<Request>,
    session: Option<Arc<dyn Session>>,
    actor: Mutex<ActorSlot>,
}

impl Context {
    pub fn new(module: Arc<AuthModule>) -> Self {
        Self {
            module,
            request: None,
            session: None,
            actor: Mutex::new(ActorSlot::Unresolved),
        }
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    #[inline]
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    #[inline]
    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    #[inline]
    pub fn module(&self) -> &AuthModule {
        &self.module
    }

    /// The current actor, `None` for anonymous requests.
    pub async fn actor(&self) -> Option<Actor> {
        let mut slot = self.actor.lock().await;
        self.resolve(&mut slot).await
    }

    /// Replaces the current actor, e.g. on login or logout. The change is
    /// persisted by [`Context::finish`].
    ///
    /// The previously stored actor is resolved first so that `finish` can
    /// tell whether anything changed.
    pub async fn set_actor(&self, actor: Option<Actor>) {
        let mut slot = self.actor.lock().await;
        self.resolve(&mut slot).await;
        if let ActorSlot::Resolved { current, .. } = &mut *slot {
            *current = actor;
        }
    }

    /// Ends the request: when the actor differs from the one resolved at the
    /// start, the new value is propagated through the chain's `store`.
    pub async fn finish(&self) -> Result<()> {
        let changed = {
            let slot = self.actor.lock().await;
            if !slot.is_changed() {
                return Ok(());
            }
            match &*slot {
                ActorSlot::Resolved { current, .. } => current.clone(),
                ActorSlot::Unresolved => return Ok(()),
            }
        };

        debug!(
            "Actor changed during request, storing {:?}",
            changed.as_ref().map(|a| a.id.as_str())
        );
        self.module
            .authenticator()
            .store(self, changed.as_ref())
            .await?;
        self.mark_stored(changed).await;
        Ok(())
    }

    /// Stores the current actor unconditionally, resolving it first if
    /// nobody has asked for it yet.
    pub async fn persist_actor(&self) -> Result<()> {
        let actor = self.actor().await;
        self.module
            .authenticator()
            .store(self, actor.as_ref())
            .await?;
        self.mark_stored(actor).await;
        Ok(())
    }

    /// Passthrough to [`crate::authz::RuleSet::permits`] with this context and
    /// its actor.
    pub async fn permits(&self, operation: &str, subject: Subject<'_>) -> Result<bool, AuthError> {
        let actor = self.actor().await;
        self.module
            .rules()
            .permits(Some(self), actor.as_ref(), operation, subject)
    }

    pub async fn ensure_permits(
        &self,
        operation: &str,
        subject: Subject<'_>,
    ) -> Result<(), AuthError> {
        let actor = self.actor().await;
        self.module
            .rules()
            .ensure_permits(Some(self), actor.as_ref(), operation, subject)
    }

    async fn resolve(&self, slot: &mut ActorSlot) -> Option<Actor> {
        if let ActorSlot::Resolved { current, .. } = slot {
            return current.clone();
        }

        let resolution = self.module.authenticator().retrieve(self).await;
        let actor = resolution.actor;
        // A login that could not be stored counts as unsaved, so `finish`
        // retries and reports the failure.
        let initial = match resolution.store_error {
            Some(e) => {
                warn!("Logged in actor not stored, retrying on finish: {e:#}");
                None
            }
            None => actor.clone(),
        };
        *slot = ActorSlot::Resolved {
            initial,
            current: actor.clone(),
        };
        actor
    }

    async fn mark_stored(&self, actor: Option<Actor>) {
        let mut slot = self.actor.lock().await;
        if let ActorSlot::Resolved { initial, .. } = &mut *slot {
            *initial = actor;
        }
    }
}
