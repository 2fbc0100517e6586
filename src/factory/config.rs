use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::authn::config::{complete_authenticators, AuthenticatorConfig};
use crate::config::CommonConfig;
use crate::model::config::GroupConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    /// The closed set of permission labels groups may reference.
    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Chain nodes in consultation order.
    #[serde(default)]
    pub authenticators: Vec<AuthenticatorConfig>,

    /// Shorthand for a chain with a single node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator: Option<AuthenticatorConfig>,
}

impl CommonConfig for AuthConfig {
    fn default() -> Self {
        Self {
            permissions: Vec::new(),
            groups: Vec::new(),
            authenticators: Vec::new(),
            authenticator: None,
        }
    }

    fn complete(&mut self) -> Result<()> {
        if let Some(single) = self.authenticator.take() {
            if !self.authenticators.is_empty() {
                bail!("'authenticator' and 'authenticators' cannot both be set");
            }
            self.authenticators.push(single);
        }
        complete_authenticators(&mut self.authenticators)?;
        Ok(())
    }
}
