//! Action registry: built-in actions keyed by functor name.
//!
//! An action is a factory for unifier generators. When the goal engine
//! meets an atom goal whose functor is registered here, it defers entirely
//! to the action's generator; unknown functors are not an error and fall
//! through to belief matching.

use std::collections::HashMap;

use aspeak_core::{Agent, BeliefAtom, Unifier};

use crate::environment::Environment;
use crate::error::RuntimeError;

/// Everything an action generator may need: the environment (for output
/// and the outbox), the agent being stepped, the invoking atom, and the
/// unifier in force at the call site.
pub struct ActionContext<'a> {
    pub env: &'a Environment,
    pub agent: &'a Agent,
    pub atom: BeliefAtom,
    pub unifier: Unifier,
}

/// A pull-based producer of unifiers, the action-side counterpart of the
/// goal generators.
///
/// `current` is only meaningful after `next` has returned `Ok(true)`.
pub trait ActionGenerator {
    fn next(&mut self) -> Result<bool, RuntimeError>;
    fn current(&self) -> Unifier;
}

/// A built-in action: a named generator factory.
pub trait Action {
    /// The functor this action is invoked by, e.g. `.print`.
    fn name(&self) -> &str;

    /// Creates a fresh generator for one invocation.
    fn spawn<'a>(&'a self, ctx: ActionContext<'a>) -> Box<dyn ActionGenerator + 'a>;
}

/// Registry mapping functor names to actions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Box<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ActionRegistry::default()
    }

    /// Registers an action under its own name.
    ///
    /// # Errors
    ///
    /// Returns an error if an action with the same name is already
    /// registered.
    pub fn register(&mut self, action: Box<dyn Action>) -> Result<(), RuntimeError> {
        let name = action.name().to_string();
        if self.actions.contains_key(&name) {
            return Err(RuntimeError::action(name, "already registered"));
        }

        tracing::debug!(action = %name, "registered action");
        self.actions.insert(name, action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(|action| action.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }
}
