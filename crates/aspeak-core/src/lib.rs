//! aspeak-core — fundamental types for the aspeak interpreter.
//!
//! This crate provides the term algebra with its partial-evaluation smart
//! constructors, first-order unification, the static program model, and
//! the runtime agent state that every other aspeak crate builds on.

pub mod agent;
pub mod error;
pub mod ops;
pub mod printer;
pub mod program;
pub mod term;
pub mod unify;

pub use agent::{Agent, Intention, IntentionFrame};
pub use error::TermError;
pub use program::{AgentProgram, BodyFormula, FormulaKind, GoalKind, Plan, Rule, TriggerKind};
pub use term::{BeliefAtom, BinaryOp, Term, TermTag, UnaryOp, Variable};
pub use unify::{unifies_with, unify, Anonymizer, Unifier};
