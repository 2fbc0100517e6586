use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::debug;

use crate::context::Context;
use crate::directory::Directory;
use crate::model::{Actor, ActorId};

use super::{Authenticator, AuthnResponse};

/// How the actor is kept in the session.
pub enum SessionPayload {
    /// Only the actor id is stored; the actor is loaded from the directory
    /// on every request.
    Directory(Arc<dyn Directory>),
    /// The whole actor is stored as JSON.
    Json,
}

/// Remembers the actor in the request's session.
pub struct SessionAuthenticator {
    session_key: String,
    payload: SessionPayload,
}

impl SessionAuthenticator {
    pub const DEFAULT_SESSION_KEY: &'static str = "actor";

    pub fn new(payload: SessionPayload) -> Self {
        Self::with_key(Self::DEFAULT_SESSION_KEY, payload)
    }

    pub fn with_key(session_key: &str, payload: SessionPayload) -> Self {
        Self {
            session_key: session_key.to_string(),
            payload,
        }
    }

    fn dump(&self, actor: &Actor) -> Result<String> {
        match self.payload {
            SessionPayload::Directory(_) => Ok(actor.id.to_string()),
            SessionPayload::Json => serde_json::to_string(actor).context("encode actor to json"),
        }
    }

    async fn load(&self, data: String) -> Result<Option<Actor>> {
        match &self.payload {
            SessionPayload::Directory(directory) => {
                directory
                    .get(&ActorId::new(data))
                    .await
                    .context("load actor from directory")
            }
            SessionPayload::Json => {
                let actor: Actor =
                    serde_json::from_str(&data).context("decode actor json from session")?;
                Ok(Some(actor))
            }
        }
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn retrieve(&self, ctx: &Context) -> Result<AuthnResponse> {
        let session = match ctx.session() {
            Some(session) => session,
            None => return Ok(AuthnResponse::Continue),
        };

        let data = match session.get(&self.session_key).await? {
            Some(data) => data,
            None => return Ok(AuthnResponse::Continue),
        };

        match self.load(data).await? {
            Some(actor) => Ok(AuthnResponse::Ok(actor)),
            None => {
                debug!(
                    "Session key '{}' refers to an unknown actor, ignoring it",
                    self.session_key
                );
                Ok(AuthnResponse::Continue)
            }
        }
    }

    async fn store(&self, ctx: &Context, actor: Option<&Actor>) -> Result<()> {
        let session = match ctx.session() {
            Some(session) => session,
            None => return Ok(()),
        };

        match actor {
            Some(actor) => {
                let data = self.dump(actor)?;
                session.set(&self.session_key, data).await
            }
            None => session.remove(&self.session_key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::{MemorySession, Session};
    use crate::directory::MemoryDirectory;
    use crate::factory::AuthModule;
    use crate::model::{ActorKind, Group, Permission};

    use super::*;

    fn mock_directory() -> Arc<dyn Directory> {
        let mut dir = MemoryDirectory::new();
        dir.insert(Actor::new("1", "Stephen")).unwrap();
        Arc::new(dir)
    }

    fn mock_context(session: &Arc<MemorySession>) -> Context {
        Context::new(Arc::new(AuthModule::default())).with_session(session.clone())
    }

    #[tokio::test]
    async fn test_directory_payload() {
        let auth = SessionAuthenticator::new(SessionPayload::Directory(mock_directory()));

        let session = Arc::new(MemorySession::new());
        let ctx = mock_context(&session);
        let resp = auth.retrieve(&ctx).await.unwrap();
        assert!(matches!(resp, AuthnResponse::Continue));

        auth.store(&ctx, Some(&Actor::new("1", "Stephen")))
            .await
            .unwrap();
        assert_eq!(session.get("actor").await.unwrap().as_deref(), Some("1"));

        let ctx = mock_context(&session);
        match auth.retrieve(&ctx).await.unwrap() {
            AuthnResponse::Ok(actor) => assert_eq!(actor.name, "Stephen"),
            resp => panic!("expect ok, found {resp:?}"),
        }

        auth.store(&ctx, None).await.unwrap();
        assert!(session.is_empty().await);
    }

    #[tokio::test]
    async fn test_stale_actor() {
        let auth = SessionAuthenticator::new(SessionPayload::Directory(mock_directory()));
        let session = Arc::new(MemorySession::with_entry("actor", "99"));
        let resp = auth.retrieve(&mock_context(&session)).await.unwrap();
        assert!(matches!(resp, AuthnResponse::Continue));
    }

    #[tokio::test]
    async fn test_json_payload() {
        let auth = SessionAuthenticator::with_key("who", SessionPayload::Json);
        let owners = Arc::new(Group::new(
            "owners",
            [Permission::new_static("sing_a_song")],
        ));
        let actor = Actor::new("7", "nightly")
            .with_kind(ActorKind::Cron)
            .with_group(owners);

        let session = Arc::new(MemorySession::new());
        auth.store(&mock_context(&session), Some(&actor))
            .await
            .unwrap();
        assert!(session.get("actor").await.unwrap().is_none());
        assert!(session.get("who").await.unwrap().is_some());

        match auth.retrieve(&mock_context(&session)).await.unwrap() {
            AuthnResponse::Ok(loaded) => {
                assert_eq!(loaded, actor);
                assert_eq!(loaded.kind, ActorKind::Cron);
                assert!(loaded.has_permission(&Permission::new("sing_a_song")));
            }
            resp => panic!("expect ok, found {resp:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let auth = SessionAuthenticator::new(SessionPayload::Json);
        let session = Arc::new(MemorySession::with_entry("actor", "{not json"));
        assert!(auth.retrieve(&mock_context(&session)).await.is_err());
    }

    #[tokio::test]
    async fn test_no_session() {
        let auth = SessionAuthenticator::new(SessionPayload::Json);
        let ctx = Context::new(Arc::new(AuthModule::default()));
        let resp = auth.retrieve(&ctx).await.unwrap();
        assert!(matches!(resp, AuthnResponse::Continue));
        // Nothing to persist into
        auth.store(&ctx, Some(&Actor::new("1", "Stephen")))
            .await
            .unwrap();
    }
}
