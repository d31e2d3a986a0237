//! The static program of an agent: rules, plans, and their building blocks.
//!
//! Programs are produced by the parser, validated at load time, and never
//! mutated afterwards; all runtime state lives in [`crate::agent`].

use crate::term::{BeliefAtom, Term};

/// What kind of belief-base change triggers a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerKind {
    Add,
    Remove,
}

/// What kind of event a plan reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalKind {
    Achieve,
    Test,
    Belief,
}

/// The kind of a plan-body formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormulaKind {
    /// Assert a logical consequence (or run an action).
    Term,
    /// `?` — test goal (reserved).
    Test,
    /// `!` — sub-goal pushed onto the current intention.
    Achieve,
    /// `!!` — detached goal (reserved).
    AchieveLater,
    /// `+` — belief addition.
    Add,
    /// `-` — belief removal.
    Remove,
    /// `-+` — belief replacement.
    Replace,
}

/// One step of a plan body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyFormula {
    pub kind: FormulaKind,
    pub term: Term,
}

impl Default for BodyFormula {
    /// The no-op formula standing in for an empty concrete body.
    fn default() -> Self {
        BodyFormula {
            kind: FormulaKind::Term,
            term: Term::Bool(true),
        }
    }
}

/// A rule: whenever the head unifies, the body term must also hold.
///
/// Non-ground beliefs in source programs are stored as implicit rules with
/// `rhs = true`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub lhs: BeliefAtom,
    pub rhs: Term,
}

/// A reactive plan: a triggering event, a context condition, and a body.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub trigger: TriggerKind,
    pub goal: GoalKind,
    pub head: BeliefAtom,
    pub context: Term,
    pub body: Vec<BodyFormula>,
}

/// A parsed agent program: the parser's output and the loader's input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentProgram {
    pub beliefs: Vec<BeliefAtom>,
    pub rules: Vec<Rule>,
    /// Initial achievement goals, in source order.
    pub goals: Vec<BeliefAtom>,
    pub plans: Vec<Plan>,
}
