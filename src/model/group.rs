use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::config::GroupConfig;
use super::Permission;

/// A named container of permissions, assignable to many actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,

    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl Group {
    pub fn new<I>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = Permission>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// Unions the permissions of every given group. Duplicates across groups
/// collapse, and the result does not depend on iteration order.
pub fn effective_permissions<'a, I>(groups: I) -> BTreeSet<Permission>
where
    I: IntoIterator<Item = &'a Group>,
{
    groups
        .into_iter()
        .flat_map(|group| group.permissions.iter().cloned())
        .collect()
}

/// The groups known to an application, built once from configuration.
///
/// Building validates the permission catalog: a group may only reference
/// permissions that were declared up front.
#[derive(Debug, Default)]
pub struct GroupCatalog {
    declared: BTreeSet<Permission>,
    groups: HashMap<String, Arc<Group>>,
}

impl GroupCatalog {
    pub fn build(permissions: &[String], groups: &[GroupConfig]) -> Result<Self> {
        let mut declared = BTreeSet::new();
        for name in permissions {
            if name.is_empty() {
                bail!("permission name cannot be empty");
            }
            if !declared.insert(Permission::new(name.as_str())) {
                bail!("permission '{name}' is declared more than once");
            }
        }

        let mut catalog = HashMap::with_capacity(groups.len());
        for cfg in groups {
            if cfg.name.is_empty() {
                bail!("group name cannot be empty");
            }

            let mut perms = BTreeSet::new();
            for name in cfg.permissions.iter() {
                let perm = Permission::new(name.as_str());
                if !declared.contains(&perm) {
                    bail!(
                        "group '{}' references undeclared permission '{name}'",
                        cfg.name
                    );
                }
                perms.insert(perm);
            }

            let group = Arc::new(Group {
                name: cfg.name.clone(),
                permissions: perms,
            });
            if catalog.insert(cfg.name.clone(), group).is_some() {
                bail!("group '{}' is defined more than once", cfg.name);
            }
        }

        Ok(Self {
            declared,
            groups: catalog,
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.get(name).cloned()
    }

    pub fn is_declared(&self, permission: &Permission) -> bool {
        self.declared.contains(permission)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
