//! Request-time authentication and authorization.
//!
//! A [`ChainAuthenticator`] answers "who is the current actor" by asking its
//! nodes in order, and a [`RuleSet`] answers "may this actor perform this
//! operation on this object". A per-request [`Context`] ties both together.

pub mod authn;
pub mod authz;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod factory;
pub mod hash;
pub mod logs;
pub mod model;

pub use authn::{Authenticator, AuthnResponse, ChainAuthenticator};
pub use authz::{RuleSet, RuleSetBuilder, Subject};
pub use context::{Context, Request, Session};
pub use directory::Directory;
pub use error::AuthError;
pub use factory::config::AuthConfig;
pub use factory::{AuthFactory, AuthModule};
pub use model::{Actor, ActorId, ActorKind, Group, Permission};
