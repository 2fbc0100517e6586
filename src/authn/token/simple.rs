use anyhow::{bail, Result};

use crate::model::ActorId;

use super::TokenValidator;

/// Accepts `simple-token-<id>` for any id.
#[derive(Debug, Clone)]
pub struct SimpleToken;

impl SimpleToken {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_token(id: &str) -> String {
        format!("simple-token-{id}")
    }
}

impl TokenValidator for SimpleToken {
    fn validate_token(&self, token: &str) -> Result<ActorId> {
        match token.strip_prefix("simple-token-") {
            Some(id) if !id.is_empty() => Ok(ActorId::new(id)),
            _ => bail!("invalid simple token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::run_token_tests;
    use super::*;

    #[test]
    fn test_simple() {
        let token = SimpleToken::generate_token("7");
        run_token_tests(&SimpleToken::new(), &[(token.as_str(), "7")]);
        assert!(SimpleToken::new().validate_token("simple-token-").is_err());
    }
}
