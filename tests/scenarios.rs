use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;

use warden::authn::{LoginAuthenticator, SessionAuthenticator, SessionPayload};
use warden::config::parse_config;
use warden::context::MemorySession;
use warden::directory::MemoryDirectory;
use warden::model::GroupCatalog;
use warden::{
    Actor, AuthConfig, AuthError, AuthFactory, AuthModule, Authenticator, AuthnResponse,
    ChainAuthenticator, Context, Directory, Permission, Request, RuleSet, Subject,
};

const SING_A_SONG: Permission = Permission::new_static("sing_a_song");
const SHOOT_ASTEROIDS: Permission = Permission::new_static("shoot_asteroids");

const CONFIG: &str = r#"
permissions = ["sing_a_song", "shoot_asteroids"]

[[groups]]
name = "owners"
permissions = ["sing_a_song", "shoot_asteroids"]

[[groups]]
name = "audience"

[[authenticators]]
kind = "login"

[[authenticators]]
kind = "session"
"#;

struct Song {
    title: &'static str,
    performer: &'static str,
}

static GALAXY_SONG: Song = Song {
    title: "Galaxy Song",
    performer: "stephen",
};

static OTHER_SONG: Song = Song {
    title: "Always Look on the Bright Side of Life",
    performer: "brian",
};

fn mock_rules() -> RuleSet {
    let mut builder = RuleSet::builder();
    builder
        .rule("sing", |_ctx, song: &Song, actor| match actor {
            Some(actor) => {
                actor.id.as_str() == song.performer && actor.has_permission(&SING_A_SONG)
            }
            None => false,
        })
        .unwrap()
        .global_rule("shoot", |_ctx, actor| {
            actor.is_some_and(|a| a.has_permission(&SHOOT_ASTEROIDS))
        })
        .unwrap()
        // Only from the control room
        .global_rule("launch", |ctx, actor| {
            let from_console = ctx
                .and_then(|ctx| ctx.request())
                .and_then(|req| req.header("X-Console"))
                .is_some_and(|console| console == "control-room");
            from_console && actor.is_some_and(|a| a.has_permission(&SHOOT_ASTEROIDS))
        })
        .unwrap();
    builder.build()
}

fn mock_stephen(groups: &GroupCatalog) -> Actor {
    Actor::new("stephen", "Stephen").with_group(groups.get("owners").unwrap())
}

static MODULE: Lazy<Arc<AuthModule>> = Lazy::new(|| {
    let cfg: AuthConfig = parse_config(CONFIG).unwrap();
    let groups = GroupCatalog::build(&cfg.permissions, &cfg.groups).unwrap();

    let mut dir = MemoryDirectory::new();
    dir.insert_with_login(mock_stephen(&groups), "stephen", "black holes")
        .unwrap();
    dir.insert_with_login(
        Actor::new("brian", "Brian").with_group(groups.get("audience").unwrap()),
        "brian",
        "not the messiah",
    )
    .unwrap();

    AuthFactory::new(&cfg)
        .with_directory(Arc::new(dir))
        .build(mock_rules())
        .unwrap()
});

#[test]
fn test_owner_permissions() {
    let stephen = mock_stephen(MODULE.groups());
    let permissions: Vec<_> = stephen.permissions().into_iter().collect();
    assert_eq!(permissions, vec![SHOOT_ASTEROIDS, SING_A_SONG]);
    assert!(stephen.in_group("owners"));
}

#[test]
fn test_sing_own_song() {
    let stephen = mock_stephen(MODULE.groups());
    let rules = MODULE.rules();
    assert!(rules
        .permits(None, Some(&stephen), "sing", Subject::of(&GALAXY_SONG))
        .unwrap());
    // Repeated queries see the same answer
    for _ in 0..3 {
        assert!(rules
            .permits(None, Some(&stephen), "sing", Subject::of(&GALAXY_SONG))
            .unwrap());
    }
}

#[test]
fn test_sing_other_song() {
    let stephen = mock_stephen(MODULE.groups());
    let allowed = MODULE
        .rules()
        .permits(None, Some(&stephen), "sing", Subject::of(&OTHER_SONG))
        .unwrap();
    assert!(!allowed, "{} is not performed by Stephen", OTHER_SONG.title);
}

#[test]
fn test_fly_has_no_rule() {
    let stephen = mock_stephen(MODULE.groups());
    let err = MODULE
        .rules()
        .permits(None, Some(&stephen), "fly", Subject::of(&GALAXY_SONG))
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::RuleNotFound {
            operation: String::from("fly"),
            subject: "Song",
        }
    );
}

#[tokio::test]
async fn test_anonymous_request() {
    // Neither a form nor a session: login, session and null all decline
    let ctx = Context::new(MODULE.clone()).with_request(Request::new("get"));
    assert!(ctx.actor().await.is_none());
    assert!(!ctx.permits("shoot", Subject::none()).await.unwrap());
    assert!(!ctx.permits("sing", Subject::of(&GALAXY_SONG)).await.unwrap());
}

type Journal = Arc<Mutex<Vec<&'static str>>>;

/// Notes every `retrieve` of the wrapped node.
struct Recording<A> {
    inner: A,
    journal: Journal,
}

impl<A: Authenticator + 'static> Recording<A> {
    fn boxed(inner: A, journal: &Journal) -> Box<dyn Authenticator> {
        Box::new(Self {
            inner,
            journal: journal.clone(),
        })
    }
}

#[async_trait]
impl<A: Authenticator> Authenticator for Recording<A> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn retrieve(&self, ctx: &Context) -> Result<AuthnResponse> {
        self.journal.lock().unwrap().push(self.inner.name());
        self.inner.retrieve(ctx).await
    }

    async fn store(&self, ctx: &Context, actor: Option<&Actor>) -> Result<()> {
        self.inner.store(ctx, actor).await
    }
}

#[tokio::test]
async fn test_anonymous_consults_every_node() {
    let dir: Arc<dyn Directory> = Arc::new(MemoryDirectory::new());
    let journal = Journal::default();
    let chain = ChainAuthenticator::new(vec![
        Recording::boxed(LoginAuthenticator::new(dir.clone()), &journal),
        Recording::boxed(
            SessionAuthenticator::new(SessionPayload::Directory(dir)),
            &journal,
        ),
    ]);
    assert_eq!(chain.names(), vec!["login", "session", "null"]);
    let module = Arc::new(AuthModule::new(chain, mock_rules(), GroupCatalog::default()));

    let ctx = Context::new(module)
        .with_request(Request::new("get"))
        .with_session(Arc::new(MemorySession::new()));
    assert!(ctx.actor().await.is_none());
    assert_eq!(*journal.lock().unwrap(), vec!["login", "session"]);

    // The actor is cached for the rest of the request
    assert!(!ctx.permits("shoot", Subject::none()).await.unwrap());
    assert!(ctx.actor().await.is_none());
    assert_eq!(journal.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rule_reads_request() {
    let login = || {
        Request::new("post").with_form([("username", "stephen"), ("password", "black holes")])
    };

    let ctx = Context::new(MODULE.clone()).with_request(login());
    assert!(ctx.permits("shoot", Subject::none()).await.unwrap());
    assert!(!ctx.permits("launch", Subject::none()).await.unwrap());

    let req = login().with_header("X-Console", "control-room");
    let ctx = Context::new(MODULE.clone()).with_request(req);
    assert!(ctx.permits("launch", Subject::none()).await.unwrap());

    // Without a request context the rule has nothing to go on
    let stephen = mock_stephen(MODULE.groups());
    assert!(!MODULE
        .rules()
        .permits(None, Some(&stephen), "launch", Subject::none())
        .unwrap());
}

#[tokio::test]
async fn test_context_permits() {
    let req = Request::new("post").with_form([("username", "stephen"), ("password", "black holes")]);
    let ctx = Context::new(MODULE.clone()).with_request(req);

    assert!(ctx.permits("sing", Subject::of(&GALAXY_SONG)).await.unwrap());
    assert!(ctx.permits("shoot", Subject::none()).await.unwrap());
    ctx.ensure_permits("shoot", Subject::none()).await.unwrap();

    let err = ctx
        .ensure_permits("sing", Subject::of(&OTHER_SONG))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotAuthorized { .. }));
    assert_eq!(err.to_string(), "context does not permit sing(Song)");
}

#[tokio::test]
async fn test_audience_cannot_shoot() {
    let req = Request::new("post").with_form([("username", "brian"), ("password", "not the messiah")]);
    let ctx = Context::new(MODULE.clone()).with_request(req);

    let actor = ctx.actor().await.unwrap();
    assert!(actor.permissions().is_empty());
    assert!(!ctx.permits("shoot", Subject::none()).await.unwrap());
    assert!(ctx.permits("sing", Subject::of(&OTHER_SONG)).await.is_ok());
}
