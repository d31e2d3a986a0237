//! The term algebra.
//!
//! A [`Term`] is the universal value of the interpreter: literals, lists,
//! belief atoms, logic variables, and unevaluated operator applications all
//! live in one recursive sum type with value semantics. Operator nodes only
//! exist as *residuals*: the smart constructors in [`crate::ops`] partially
//! evaluate on construction and fall back to a residual `Unary`/`Binary`
//! node when an operand is still a variable or another residual.

use serde::{Deserialize, Serialize};

/// A logic variable with a name.
///
/// The name `_` denotes the anonymous wildcard: it unifies with anything
/// and is never recorded in a unifier, so each occurrence may bind
/// differently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable { name: name.into() }
    }

    /// True for the anonymous wildcard `_`.
    pub fn is_wildcard(&self) -> bool {
        self.name == "_"
    }
}

/// A first-order predicate: a functor applied to zero or more terms.
///
/// The pair *(functor, arity)* identifies the predicate for belief lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefAtom {
    pub functor: String,
    pub terms: Vec<Term>,
}

impl BeliefAtom {
    pub fn new(functor: impl Into<String>, terms: Vec<Term>) -> Self {
        BeliefAtom {
            functor: functor.into(),
            terms,
        }
    }

    /// A zero-argument atom.
    pub fn nullary(functor: impl Into<String>) -> Self {
        BeliefAtom::new(functor, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }
}

/// Unary operator tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
}

/// Binary operator tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Pow,
    Mul,
    Div,
    IDiv,
    Mod,
    And,
    Or,
    Unify,
    Deconstruct,
    Eq,
    Neq,
    Lt,
    Lte,
}

/// A term of the agent language.
///
/// Recursive arms box their children; the whole type is an immutable value
/// (clone on write) and equality is structural.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Term>),
    Atom(BeliefAtom),
    Var(Variable),
    /// Residual unary operator application.
    Unary(UnaryOp, Box<Term>),
    /// Residual binary operator application.
    Binary(BinaryOp, Box<Term>, Box<Term>),
}

/// Discriminant of a term, with a total order.
///
/// The declaration order is load-bearing: the structural comparison
/// operators order unequal concrete types by this tag order, and the
/// residual classes below rank arithmetic residuals with `Num` and logical
/// residuals with `Bool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TermTag {
    Bool,
    Num,
    Str,
    List,
    Atom,
    Var,
    Pos,
    Neg,
    Not,
    Add,
    Sub,
    Pow,
    Mul,
    Div,
    IDiv,
    Mod,
    And,
    Or,
    Unify,
    Deconstruct,
    Eq,
    Neq,
    Lt,
    Lte,
}

impl TermTag {
    /// Tag a residual arithmetic operation evaluates to.
    pub fn is_arithmetic_residual(self) -> bool {
        matches!(
            self,
            TermTag::Pos
                | TermTag::Neg
                | TermTag::Add
                | TermTag::Sub
                | TermTag::Pow
                | TermTag::Mul
                | TermTag::Div
                | TermTag::IDiv
                | TermTag::Mod
        )
    }

    /// Tag a residual logical operation evaluates to.
    pub fn is_logical_residual(self) -> bool {
        matches!(
            self,
            TermTag::Not
                | TermTag::And
                | TermTag::Or
                | TermTag::Unify
                | TermTag::Deconstruct
                | TermTag::Eq
                | TermTag::Neq
                | TermTag::Lt
                | TermTag::Lte
        )
    }

    /// Rank used for cross-type comparisons, when decidable.
    ///
    /// Residuals rank with the concrete type they are guaranteed to
    /// evaluate to; variables have no rank.
    pub fn comparison_rank(self) -> Option<u8> {
        match self {
            TermTag::Bool => Some(0),
            TermTag::Num => Some(1),
            TermTag::Str => Some(2),
            TermTag::List => Some(3),
            TermTag::Atom => Some(4),
            TermTag::Var => None,
            t if t.is_arithmetic_residual() => Some(1),
            _ => Some(0),
        }
    }
}

impl Term {
    pub fn tag(&self) -> TermTag {
        match self {
            Term::Bool(_) => TermTag::Bool,
            Term::Num(_) => TermTag::Num,
            Term::Str(_) => TermTag::Str,
            Term::List(_) => TermTag::List,
            Term::Atom(_) => TermTag::Atom,
            Term::Var(_) => TermTag::Var,
            Term::Unary(UnaryOp::Pos, _) => TermTag::Pos,
            Term::Unary(UnaryOp::Neg, _) => TermTag::Neg,
            Term::Unary(UnaryOp::Not, _) => TermTag::Not,
            Term::Binary(op, _, _) => match op {
                BinaryOp::Add => TermTag::Add,
                BinaryOp::Sub => TermTag::Sub,
                BinaryOp::Pow => TermTag::Pow,
                BinaryOp::Mul => TermTag::Mul,
                BinaryOp::Div => TermTag::Div,
                BinaryOp::IDiv => TermTag::IDiv,
                BinaryOp::Mod => TermTag::Mod,
                BinaryOp::And => TermTag::And,
                BinaryOp::Or => TermTag::Or,
                BinaryOp::Unify => TermTag::Unify,
                BinaryOp::Deconstruct => TermTag::Deconstruct,
                BinaryOp::Eq => TermTag::Eq,
                BinaryOp::Neq => TermTag::Neq,
                BinaryOp::Lt => TermTag::Lt,
                BinaryOp::Lte => TermTag::Lte,
            },
        }
    }

    /// A ground term contains no variables (and no residuals, which can
    /// only exist around variables).
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Bool(_) | Term::Num(_) | Term::Str(_) => true,
            Term::List(items) => items.iter().all(Term::is_ground),
            Term::Atom(atom) => atom.terms.iter().all(Term::is_ground),
            Term::Var(_) | Term::Unary(..) | Term::Binary(..) => false,
        }
    }

    /// A unifiable term has only ground terms or variables at its leaves.
    ///
    /// Operator residuals are not unifiable until they have been evaluated
    /// under a more specific unifier.
    pub fn is_unifiable(&self) -> bool {
        match self {
            Term::Var(_) => true,
            Term::List(items) => items.iter().all(Term::is_unifiable),
            Term::Atom(atom) => atom.terms.iter().all(Term::is_unifiable),
            other => other.is_ground(),
        }
    }

    /// Whether the term may appear as a plan context or rule body.
    ///
    /// Arithmetic expressions and the `+`/`-` unary operators are values,
    /// not conditions, so they are rejected at the root.
    pub fn is_valid_context(&self) -> bool {
        match self.tag() {
            TermTag::Bool | TermTag::Atom | TermTag::Var => true,
            tag => tag.is_logical_residual(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Term::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Term::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_atom(&self) -> Option<&BeliefAtom> {
        match self {
            Term::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::Bool(value)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Num(value)
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Str(value.to_string())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::Str(value)
    }
}

impl From<Vec<Term>> for Term {
    fn from(value: Vec<Term>) -> Self {
        Term::List(value)
    }
}

impl From<BeliefAtom> for Term {
    fn from(value: BeliefAtom) -> Self {
        Term::Atom(value)
    }
}

impl From<Variable> for Term {
    fn from(value: Variable) -> Self {
        Term::Var(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Term {
        Term::Var(Variable::new(name))
    }

    #[test]
    fn test_groundness() {
        assert!(Term::Bool(true).is_ground());
        assert!(Term::Num(1.5).is_ground());
        assert!(Term::from("s").is_ground());
        assert!(!var("X").is_ground());

        let atom = Term::Atom(BeliefAtom::new("f", vec![Term::Num(1.0), var("X")]));
        assert!(!atom.is_ground());

        let ground_atom = Term::Atom(BeliefAtom::new("f", vec![Term::Num(1.0)]));
        assert!(ground_atom.is_ground());
    }

    #[test]
    fn test_unifiable() {
        let atom = Term::Atom(BeliefAtom::new("f", vec![Term::Num(1.0), var("X")]));
        assert!(atom.is_unifiable());

        let residual = Term::Binary(
            BinaryOp::Add,
            Box::new(var("X")),
            Box::new(Term::Num(1.0)),
        );
        assert!(!residual.is_ground());
        assert!(!residual.is_unifiable());

        let list = Term::List(vec![var("X"), residual]);
        assert!(!list.is_unifiable());
    }

    #[test]
    fn test_valid_context() {
        assert!(Term::Bool(true).is_valid_context());
        assert!(var("X").is_valid_context());
        assert!(Term::Atom(BeliefAtom::nullary("f")).is_valid_context());
        assert!(!Term::Num(1.0).is_valid_context());
        assert!(!Term::from("s").is_valid_context());
        assert!(!Term::List(vec![]).is_valid_context());

        let unify_residual = Term::Binary(
            BinaryOp::Unify,
            Box::new(var("X")),
            Box::new(Term::Num(1.0)),
        );
        assert!(unify_residual.is_valid_context());

        let sum = Term::Binary(
            BinaryOp::Add,
            Box::new(var("X")),
            Box::new(Term::Num(1.0)),
        );
        assert!(!sum.is_valid_context());
        assert!(!Term::Unary(UnaryOp::Pos, Box::new(var("X"))).is_valid_context());
    }

    #[test]
    fn test_tag_order() {
        assert!(TermTag::Bool < TermTag::Num);
        assert!(TermTag::Num < TermTag::Str);
        assert!(TermTag::Str < TermTag::List);
        assert!(TermTag::List < TermTag::Atom);
    }

    #[test]
    fn test_comparison_rank() {
        assert_eq!(TermTag::Pos.comparison_rank(), Some(1));
        assert_eq!(TermTag::Mod.comparison_rank(), Some(1));
        assert_eq!(TermTag::Not.comparison_rank(), Some(0));
        assert_eq!(TermTag::Lte.comparison_rank(), Some(0));
        assert_eq!(TermTag::Var.comparison_rank(), None);
    }

    #[test]
    fn test_structural_equality() {
        let a = Term::Atom(BeliefAtom::new("f", vec![Term::Num(1.0)]));
        let b = Term::Atom(BeliefAtom::new("f", vec![Term::Num(1.0)]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_round_trip() {
        let term = Term::Atom(BeliefAtom::new(
            "f",
            vec![
                Term::Num(2.0),
                Term::Bool(true),
                Term::from("str"),
                Term::List(vec![
                    Term::Atom(BeliefAtom::nullary("a")),
                    Term::Atom(BeliefAtom::nullary("b")),
                ]),
            ],
        ));
        let encoded = serde_json::to_string(&term).expect("serialize term");
        let decoded: Term = serde_json::from_str(&encoded).expect("deserialize term");
        assert_eq!(term, decoded);
    }
}
