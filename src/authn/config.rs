use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig};

/// One entry of the `[[authenticators]]` list; the `kind` key selects the node.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AuthenticatorConfig {
    Login(LoginConfig),
    Session(SessionConfig),
    Token(TokenConfig),
}

impl AuthenticatorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Session(_) => "session",
            Self::Token(_) => "token",
        }
    }

    pub fn complete(&mut self) -> Result<()> {
        match self {
            Self::Login(cfg) => cfg.complete(),
            Self::Session(cfg) => cfg.complete(),
            Self::Token(cfg) => cfg.complete(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoginConfig {
    #[serde(default = "LoginConfig::default_username_field")]
    pub username_field: String,

    #[serde(default = "LoginConfig::default_password_field")]
    pub password_field: String,
}

impl CommonConfig for LoginConfig {
    fn default() -> Self {
        Self {
            username_field: Self::default_username_field(),
            password_field: Self::default_password_field(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        if self.username_field.is_empty() {
            bail!("username_field cannot be empty");
        }
        if self.password_field.is_empty() {
            bail!("password_field cannot be empty");
        }
        if self.username_field == self.password_field {
            bail!("username_field and password_field must be different");
        }
        Ok(())
    }
}

impl LoginConfig {
    pub fn default_username_field() -> String {
        String::from("username")
    }

    pub fn default_password_field() -> String {
        String::from("password")
    }
}

/// What a session entry holds.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// The actor id, looked up in the directory.
    #[default]
    Directory,
    /// The actor itself, as JSON.
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_session_key")]
    pub session_key: String,

    #[serde(default)]
    pub payload: PayloadKind,
}

impl CommonConfig for SessionConfig {
    fn default() -> Self {
        Self {
            session_key: Self::default_session_key(),
            payload: PayloadKind::default(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        if self.session_key.is_empty() {
            bail!("session_key cannot be empty");
        }
        Ok(())
    }
}

impl SessionConfig {
    pub fn default_session_key() -> String {
        String::from("actor")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenConfig {
    /// Actor id to hex SHA-256 digest of its token. Values may reference
    /// environment variables.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

impl CommonConfig for TokenConfig {
    fn default() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        if self.tokens.is_empty() {
            bail!("token authenticator requires at least one token");
        }
        for (id, digest) in self.tokens.iter_mut() {
            if id.is_empty() {
                bail!("token actor id cannot be empty");
            }
            let expanded = expandenv(&format!("tokens.{id}"), digest.as_str())?;
            if expanded.len() != 64 || !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
                bail!("token for '{id}' must be a hex SHA-256 digest, see `warden digest`");
            }
            *digest = expanded.to_lowercase();
        }
        Ok(())
    }
}

/// Completes every entry, naming the failing one.
pub fn complete_authenticators(cfgs: &mut [AuthenticatorConfig]) -> Result<()> {
    for (idx, cfg) in cfgs.iter_mut().enumerate() {
        let name = cfg.name();
        cfg.complete()
            .with_context(|| format!("validate authenticator #{idx} ({name})"))?;
    }
    Ok(())
}
