mod ruleset;

use std::any::{self, Any, TypeId};

use crate::context::Context;
use crate::model::Actor;

pub use ruleset::{RuleSet, RuleSetBuilder};

/// The object an operation is checked against. Rules are dispatched on the
/// exact Rust type of the subject; [`Subject::none`] addresses the global
/// rules registered without a subject type.
#[derive(Clone, Copy)]
pub struct Subject<'a> {
    value: Option<&'a (dyn Any + Send + Sync)>,
    type_id: Option<TypeId>,
    type_name: &'static str,
}

impl<'a> Subject<'a> {
    pub fn of<S: Any + Send + Sync>(value: &'a S) -> Self {
        Self {
            value: Some(value as &(dyn Any + Send + Sync)),
            type_id: Some(TypeId::of::<S>()),
            type_name: short_type_name::<S>(),
        }
    }

    pub fn none() -> Self {
        Self {
            value: None,
            type_id: None,
            type_name: "",
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn key(&self) -> Option<TypeId> {
        self.type_id
    }
}

impl<'a, S: Any + Send + Sync> From<&'a S> for Subject<'a> {
    fn from(value: &'a S) -> Self {
        Self::of(value)
    }
}

type Predicate = dyn Fn(Option<&Context>, Option<&(dyn Any + Send + Sync)>, Option<&Actor>) -> bool
    + Send
    + Sync;

/// A registered predicate together with the subject type name it was
/// registered for.
pub(crate) struct Rule {
    subject: &'static str,
    predicate: Box<Predicate>,
}

impl Rule {
    fn typed<S, F>(predicate: F) -> Self
    where
        S: Any + Send + Sync,
        F: Fn(Option<&Context>, &S, Option<&Actor>) -> bool + Send + Sync + 'static,
    {
        Self {
            subject: short_type_name::<S>(),
            predicate: Box::new(move |ctx, subject, actor| {
                // The rule is keyed by `TypeId::of::<S>()`, so the downcast only
                // fails if the rule is invoked without a subject.
                match subject.and_then(|s| s.downcast_ref::<S>()) {
                    Some(subject) => predicate(ctx, subject, actor),
                    None => false,
                }
            }),
        }
    }

    fn global<F>(predicate: F) -> Self
    where
        F: Fn(Option<&Context>, Option<&Actor>) -> bool + Send + Sync + 'static,
    {
        Self {
            subject: "",
            predicate: Box::new(move |ctx, _subject, actor| predicate(ctx, actor)),
        }
    }

    fn evaluate(
        &self,
        ctx: Option<&Context>,
        subject: Option<&(dyn Any + Send + Sync)>,
        actor: Option<&Actor>,
    ) -> bool {
        (self.predicate)(ctx, subject, actor)
    }
}

/// `std::any::type_name` without the module path, for log and error messages.
///
/// Reference, pointer, slice, array and tuple types keep their full name so
/// `&Song` and `Song` stay distinguishable.
fn short_type_name<S: ?Sized>() -> &'static str {
    let name = any::type_name::<S>();
    if name.starts_with(['&', '*', '[', '(']) {
        return name;
    }
    match name.find('<') {
        Some(generic) => {
            let head = &name[..generic];
            match head.rfind("::") {
                Some(pos) => &name[pos + 2..],
                None => name,
            }
        }
        None => match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        },
    }
}
