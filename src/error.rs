use thiserror::Error;

/// Errors callers are expected to match on. Everything else travels as
/// [`anyhow::Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("rule for operation \"{operation}({subject})\" is already registered")]
    DuplicateRule {
        operation: String,
        subject: &'static str,
    },

    #[error("no rule defined for operation \"{operation}({subject})\"")]
    RuleNotFound {
        operation: String,
        subject: &'static str,
    },

    #[error("context does not permit {operation}({subject})")]
    NotAuthorized {
        operation: String,
        subject: &'static str,
    },

    #[error("invalid auth config: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns `true` for the rule-absence condition, which is a configuration
    /// defect rather than a denial.
    pub fn is_rule_not_found(&self) -> bool {
        matches!(self, Self::RuleNotFound { .. })
    }
}
