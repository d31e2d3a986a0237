//! Runtime errors.
//!
//! Goal failure is not represented here: a failed goal is simply an
//! exhausted generator, handled by the interpreter. These variants are the
//! semantic runtime errors of the language, which are raised and fatal.

use aspeak_core::TermError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A smart-constructor domain error surfaced while re-evaluating a
    /// term under a substitution.
    #[error(transparent)]
    Term(#[from] TermError),

    #[error("no applicable plan for achievement goal '{functor}'")]
    NoApplicablePlan { functor: String },

    #[error("only belief atoms can be added to the belief base, got '{term}'")]
    NonAtomBelief { term: String },

    #[error("only ground belief atoms can be added to the belief base, got '{term}'")]
    NonGroundBelief { term: String },

    #[error("tried to push '{term}' as an achievement goal; only belief atoms can be achieved")]
    NonAtomGoal { term: String },

    #[error("'{kind}' body formulas are not implemented")]
    UnimplementedFormula { kind: &'static str },

    #[error("action {action}: {message}")]
    Action { action: String, message: String },

    #[error("message recipient '{recipient}' not found")]
    UnknownRecipient { recipient: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub(crate) fn action(action: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Action {
            action: action.into(),
            message: message.into(),
        }
    }
}
