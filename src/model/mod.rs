mod group;

pub mod config;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use group::{effective_permissions, Group, GroupCatalog};

/// Stable identifier of an actor, unique for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    #[default]
    Person,
    Cron,
    Worker,
}

/// A symbolic capability label. Permissions carry no behavior, they are only
/// checked for membership in an actor's effective set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn new_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entity that performs operations: a person, a cron job or a worker.
///
/// Group membership is held by composition; the effective permission set is
/// derived from the groups on every call, see [`effective_permissions`].
/// Two actors are equal when their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,

    pub name: String,

    #[serde(default)]
    pub kind: ActorKind,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Arc<Group>>,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ActorKind::Person,
            groups: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ActorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_group(mut self, group: Arc<Group>) -> Self {
        self.groups.push(group);
        self
    }

    pub fn permissions(&self) -> BTreeSet<Permission> {
        effective_permissions(self.groups.iter().map(|g| g.as_ref()))
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.groups
            .iter()
            .any(|group| group.permissions.contains(permission))
    }

    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|group| group.name == name)
    }
}

impl PartialEq for Actor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Actor {}
