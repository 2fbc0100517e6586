use std::any::{Any, TypeId};
use std::collections::HashMap;

use log::{debug, warn};

use crate::context::Context;
use crate::error::AuthError;
use crate::model::Actor;

use super::{Rule, Subject};

/// Stores rules and answers whether an operation is permitted.
///
/// A rule is keyed by its operation name and the exact type of the subject
/// it applies to (or no type, for global rules). There is no fallback to a
/// more general rule: every (operation, type) pair stands on its own.
///
/// The set is immutable once built, so a single instance can be shared by
/// all concurrent requests.
#[derive(Default)]
pub struct RuleSet {
    rules: HashMap<String, HashMap<Option<TypeId>, Rule>>,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Checks if `operation` is permitted on `subject` for `actor`. `ctx` is
    /// handed to the rule as is; [`Context::permits`] passes itself.
    ///
    /// Returns [`AuthError::RuleNotFound`] if no rule was registered for the
    /// exact key. That is a configuration defect, distinct from `Ok(false)`.
    pub fn permits(
        &self,
        ctx: Option<&Context>,
        actor: Option<&Actor>,
        operation: &str,
        subject: Subject<'_>,
    ) -> Result<bool, AuthError> {
        let rule = match self
            .rules
            .get(operation)
            .and_then(|rules| rules.get(&subject.key()))
        {
            Some(rule) => rule,
            None => {
                warn!(
                    "No rule defined for operation \"{operation}({})\"",
                    subject.type_name()
                );
                return Err(AuthError::RuleNotFound {
                    operation: operation.to_string(),
                    subject: subject.type_name(),
                });
            }
        };

        let result = rule.evaluate(ctx, subject.value, actor);
        debug!(
            "Rule {operation}({}) for actor {:?}: {result}",
            rule.subject,
            actor.map(|a| a.id.as_str())
        );
        Ok(result)
    }

    /// Like [`RuleSet::permits`], but a denial is reported as
    /// [`AuthError::NotAuthorized`].
    pub fn ensure_permits(
        &self,
        ctx: Option<&Context>,
        actor: Option<&Actor>,
        operation: &str,
        subject: Subject<'_>,
    ) -> Result<(), AuthError> {
        if self.permits(ctx, actor, operation, subject)? {
            return Ok(());
        }
        Err(AuthError::NotAuthorized {
            operation: operation.to_string(),
            subject: subject.type_name(),
        })
    }

    pub fn contains<S: Any>(&self, operation: &str) -> bool {
        self.contains_key(operation, Some(TypeId::of::<S>()))
    }

    pub fn contains_global(&self, operation: &str) -> bool {
        self.contains_key(operation, None)
    }

    fn contains_key(&self, operation: &str, key: Option<TypeId>) -> bool {
        self.rules
            .get(operation)
            .is_some_and(|rules| rules.contains_key(&key))
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(|rules| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects rules at setup time. Registering a key twice fails immediately.
#[derive(Default)]
pub struct RuleSetBuilder {
    rules: HashMap<String, HashMap<Option<TypeId>, Rule>>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule for `operation` on subjects of type `S`. The predicate
    /// receives the request context (if the check was made through one), the
    /// subject and the actor.
    ///
    /// ```
    /// use warden::authz::RuleSet;
    ///
    /// struct Song {
    ///     performer: String,
    /// }
    ///
    /// let mut builder = RuleSet::builder();
    /// builder
    ///     .rule("sing", |_ctx, song: &Song, actor| {
    ///         actor.is_some_and(|actor| actor.id.as_str() == song.performer)
    ///     })
    ///     .unwrap();
    /// let rules = builder.build();
    /// assert!(rules.contains::<Song>("sing"));
    /// ```
    pub fn rule<S, F>(&mut self, operation: &str, predicate: F) -> Result<&mut Self, AuthError>
    where
        S: Any + Send + Sync,
        F: Fn(Option<&Context>, &S, Option<&Actor>) -> bool + Send + Sync + 'static,
    {
        self.insert(operation, Some(TypeId::of::<S>()), Rule::typed(predicate))?;
        Ok(self)
    }

    /// Registers a rule for `operation` checked without a subject. Besides the
    /// actor it may look at the request or session through the context.
    pub fn global_rule<F>(&mut self, operation: &str, predicate: F) -> Result<&mut Self, AuthError>
    where
        F: Fn(Option<&Context>, Option<&Actor>) -> bool + Send + Sync + 'static,
    {
        self.insert(operation, None, Rule::global(predicate))?;
        Ok(self)
    }

    fn insert(&mut self, operation: &str, key: Option<TypeId>, rule: Rule) -> Result<(), AuthError> {
        let rules = self.rules.entry(operation.to_string()).or_default();
        if rules.contains_key(&key) {
            return Err(AuthError::DuplicateRule {
                operation: operation.to_string(),
                subject: rule.subject,
            });
        }
        debug!("Register rule {operation}({})", rule.subject);
        rules.insert(key, rule);
        Ok(())
    }

    pub fn build(self) -> RuleSet {
        RuleSet { rules: self.rules }
    }
}
