//! First-order unification with an occurs check, substitution application,
//! and variable anonymization.
//!
//! A [`Unifier`] is a plain map from variable name to term. Idempotence is
//! not enforced in storage; [`Unifier::apply`] resolves chains recursively.
//! Applying a substitution rebuilds operator residuals through the smart
//! constructors, so substitution can expose further reductions (`X + 1`
//! becomes `3` once `X` is bound to `2`).

use std::collections::HashMap;

use crate::error::TermError;
use crate::term::{BeliefAtom, Term, Variable};

/// A substitution: a finite mapping from variable names to terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Unifier {
    bindings: HashMap<String, Term>,
}

impl Unifier {
    pub fn new() -> Self {
        Unifier::default()
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, term: Term) {
        self.bindings.insert(name.into(), term);
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Term)> {
        self.bindings.iter()
    }

    /// Fully resolves a variable name through the binding chain.
    pub fn resolve(&self, name: &str) -> Option<Result<Term, TermError>> {
        self.get(name).map(|bound| self.apply(bound))
    }

    /// Applies the substitution to a term.
    ///
    /// Variables resolve recursively until a non-variable or an unbound
    /// variable is reached. Operator residuals are rebuilt by re-invoking
    /// the corresponding smart constructor on the substituted children.
    pub fn apply(&self, term: &Term) -> Result<Term, TermError> {
        match term {
            Term::Bool(_) | Term::Num(_) | Term::Str(_) => Ok(term.clone()),
            Term::Var(var) => match self.get(&var.name) {
                Some(bound) => self.apply(bound),
                None => Ok(term.clone()),
            },
            Term::List(items) => Ok(Term::List(
                items
                    .iter()
                    .map(|item| self.apply(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Term::Atom(atom) => Ok(Term::Atom(self.apply_atom(atom)?)),
            Term::Unary(op, operand) => op.apply(self.apply(operand)?),
            Term::Binary(op, left, right) => {
                op.apply(self.apply(left)?, self.apply(right)?)
            }
        }
    }

    /// Applies the substitution below an atom, keeping the atom shape.
    pub fn apply_atom(&self, atom: &BeliefAtom) -> Result<BeliefAtom, TermError> {
        Ok(BeliefAtom {
            functor: atom.functor.clone(),
            terms: atom
                .terms
                .iter()
                .map(|term| self.apply(term))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

/// Resolves one side of a unification: bound variables are replaced by
/// their binding (one level), literals, lists, and atoms pass through, and
/// operator residuals are rejected — they cannot take part in unification
/// until evaluated.
fn prepare(unifier: &Unifier, term: &Term) -> Option<Term> {
    match term {
        Term::Bool(_) | Term::Num(_) | Term::Str(_) | Term::List(_) | Term::Atom(_) => {
            Some(term.clone())
        }
        Term::Var(var) => Some(
            unifier
                .get(&var.name)
                .cloned()
                .unwrap_or_else(|| term.clone()),
        ),
        Term::Unary(..) | Term::Binary(..) => None,
    }
}

/// Occurs check: whether `name` appears anywhere in `term`.
fn contains_variable(term: &Term, name: &str) -> bool {
    match term {
        Term::Var(var) => var.name == name,
        Term::List(items) => items.iter().any(|item| contains_variable(item, name)),
        Term::Atom(atom) => atom.terms.iter().any(|item| contains_variable(item, name)),
        Term::Unary(_, operand) => contains_variable(operand, name),
        Term::Binary(_, left, right) => {
            contains_variable(left, name) || contains_variable(right, name)
        }
        _ => false,
    }
}

/// Unifies two element sequences.
///
/// After the first pair, each pair is substituted through the accumulated
/// unifier before unification so that earlier bindings propagate — this is
/// what lets `[X, X+1]` unify with `[1, 2]`. A substitution error while
/// rebuilding a residual counts as a failed unification.
fn unify_slices(left: &[Term], right: &[Term], unifier: &mut Unifier) -> bool {
    if left.len() != right.len() {
        return false;
    }

    let mut pairs = left.iter().zip(right.iter());
    if let Some((l, r)) = pairs.next() {
        if !unify(l, r, unifier) {
            return false;
        }
    }

    for (l, r) in pairs {
        let (lhs, rhs) = match (unifier.apply(l), unifier.apply(r)) {
            (Ok(lhs), Ok(rhs)) => (lhs, rhs),
            _ => return false,
        };

        if !unify(&lhs, &rhs, unifier) {
            return false;
        }
    }

    true
}

/// Unifies two terms, extending `unifier` in place on success.
///
/// Unification failure is data, not an error: the function returns `false`
/// and never raises. On success `apply(unifier, left)` and
/// `apply(unifier, right)` are structurally equal.
pub fn unify(left: &Term, right: &Term, unifier: &mut Unifier) -> bool {
    let lhs = match prepare(unifier, left) {
        Some(term) => term,
        None => return false,
    };
    let rhs = match prepare(unifier, right) {
        Some(term) => term,
        None => return false,
    };

    if let (Term::Var(left_var), Term::Var(right_var)) = (&lhs, &rhs) {
        // Bind the lexicographically greater name to the lesser variable;
        // the canonical direction keeps alias chains acyclic.
        if left_var.name == right_var.name {
            return true;
        } else if left_var.name < right_var.name {
            unifier.insert(right_var.name.clone(), lhs.clone());
        } else {
            unifier.insert(left_var.name.clone(), rhs.clone());
        }
        return true;
    }

    if let Term::Var(var) = &rhs {
        // The wildcard matches without being recorded, so each `_` may
        // bind differently within one expression.
        if var.is_wildcard() {
            return true;
        }
        if contains_variable(&lhs, &var.name) {
            return false;
        }
        unifier.insert(var.name.clone(), lhs);
        return true;
    }

    if let Term::Var(var) = &lhs {
        if var.is_wildcard() {
            return true;
        }
        if contains_variable(&rhs, &var.name) {
            return false;
        }
        unifier.insert(var.name.clone(), rhs);
        return true;
    }

    match (&lhs, &rhs) {
        (Term::Bool(a), Term::Bool(b)) => a == b,
        (Term::Num(a), Term::Num(b)) => a == b,
        (Term::Str(a), Term::Str(b)) => a == b,
        (Term::List(a), Term::List(b)) => unify_slices(a, b, unifier),
        (Term::Atom(a), Term::Atom(b)) => {
            a.functor == b.functor && unify_slices(&a.terms, &b.terms, unifier)
        }
        _ => false,
    }
}

/// Checks whether a pattern unifies with a term under a throwaway unifier.
pub fn unifies_with(pattern: &Term, term: &Term) -> bool {
    let mut unifier = Unifier::new();
    unify(pattern, term, &mut unifier)
}

/// Replaces every named variable in a term with a fresh one.
///
/// Used to freshen plan triggers before pushing a sub-goal, so variables
/// of different activations cannot collide. The same source name maps to
/// the same fresh name within one pass; `_` stays `_`. Freshness comes
/// from the caller's counter, which the interpreter owns.
pub struct Anonymizer<'a> {
    counter: &'a mut u64,
    mapping: HashMap<String, String>,
}

impl<'a> Anonymizer<'a> {
    pub fn new(counter: &'a mut u64) -> Self {
        Anonymizer {
            counter,
            mapping: HashMap::new(),
        }
    }

    fn fresh_name(&mut self, source: &str) -> String {
        if let Some(name) = self.mapping.get(source) {
            return name.clone();
        }
        let name = format!("_G{}", *self.counter);
        *self.counter += 1;
        self.mapping.insert(source.to_string(), name.clone());
        name
    }

    /// Rewrites the term, renaming variables and rebuilding residuals
    /// through the smart constructors.
    pub fn anonymize(&mut self, term: &Term) -> Result<Term, TermError> {
        match term {
            Term::Bool(_) | Term::Num(_) | Term::Str(_) => Ok(term.clone()),
            Term::Var(var) => {
                if var.is_wildcard() {
                    Ok(term.clone())
                } else {
                    Ok(Term::Var(Variable::new(self.fresh_name(&var.name))))
                }
            }
            Term::List(items) => Ok(Term::List(
                items
                    .iter()
                    .map(|item| self.anonymize(item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Term::Atom(atom) => Ok(Term::Atom(self.anonymize_atom(atom)?)),
            Term::Unary(op, operand) => op.apply(self.anonymize(operand)?),
            Term::Binary(op, left, right) => {
                op.apply(self.anonymize(left)?, self.anonymize(right)?)
            }
        }
    }

    pub fn anonymize_atom(&mut self, atom: &BeliefAtom) -> Result<BeliefAtom, TermError> {
        Ok(BeliefAtom {
            functor: atom.functor.clone(),
            terms: atom
                .terms
                .iter()
                .map(|term| self.anonymize(term))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;

    fn var(name: &str) -> Term {
        Term::Var(Variable::new(name))
    }

    fn num(v: f64) -> Term {
        Term::Num(v)
    }

    #[test]
    fn test_unify_partial_atom() {
        let f_ax = Term::Atom(BeliefAtom::new("f", vec![
            Term::Atom(BeliefAtom::nullary("a")),
            var("X"),
        ]));
        let f_ab = Term::Atom(BeliefAtom::new("f", vec![
            Term::Atom(BeliefAtom::nullary("a")),
            Term::Bool(true),
        ]));

        let mut unifier = Unifier::new();
        assert!(unify(&f_ax, &f_ab, &mut unifier));
        assert_eq!(unifier.len(), 1);
        assert_eq!(unifier.get("X"), Some(&Term::Bool(true)));
    }

    #[test]
    fn test_occurs_check() {
        let f_ax = Term::Atom(BeliefAtom::new("f", vec![
            Term::Atom(BeliefAtom::nullary("a")),
            var("X"),
        ]));

        let mut unifier = Unifier::new();
        assert!(!unify(&f_ax, &var("X"), &mut unifier));
    }

    #[test]
    fn test_wildcard_not_recorded() {
        let pattern = Term::List(vec![var("_"), var("_")]);
        let value = Term::List(vec![num(1.0), num(2.0)]);

        let mut unifier = Unifier::new();
        assert!(unify(&pattern, &value, &mut unifier));
        assert!(unifier.is_empty());
    }

    #[test]
    fn test_canonical_binding_direction() {
        let mut unifier = Unifier::new();
        assert!(unify(&var("X"), &var("Y"), &mut unifier));
        // The greater name binds to the lesser variable.
        assert_eq!(unifier.get("Y"), Some(&var("X")));
        assert_eq!(unifier.get("X"), None);
    }

    #[test]
    fn test_same_variable_no_binding() {
        let mut unifier = Unifier::new();
        assert!(unify(&var("X"), &var("X"), &mut unifier));
        assert!(unifier.is_empty());
    }

    #[test]
    fn test_apply_resolves_chains() {
        let mut unifier = Unifier::new();
        unifier.insert("Y", var("X"));
        unifier.insert("X", num(5.0));

        assert_eq!(unifier.apply(&var("Y")).unwrap(), num(5.0));
    }

    #[test]
    fn test_apply_idempotent() {
        let mut unifier = Unifier::new();
        unifier.insert("X", num(1.0));
        unifier.insert("Y", Term::List(vec![var("X"), var("Z")]));

        let term = Term::Atom(BeliefAtom::new("f", vec![var("Y"), var("X")]));
        let once = unifier.apply(&term).unwrap();
        let twice = unifier.apply(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_reduces_residuals() {
        let sum = ops::add(var("X"), num(1.0)).unwrap();
        let mut unifier = Unifier::new();
        unifier.insert("X", num(2.0));
        assert_eq!(unifier.apply(&sum).unwrap(), num(3.0));
    }

    #[test]
    fn test_ordered_unification() {
        let ground = Term::List(vec![num(1.0), num(2.0)]);

        // [X, X+1] = [1, 2]: the first pair binds X, the second reduces
        // X+1 to 2 before unifying.
        let list = Term::List(vec![var("X"), ops::add(var("X"), num(1.0)).unwrap()]);
        let mut unifier = Unifier::new();
        assert!(unify(&ground, &list, &mut unifier));
        assert_eq!(unifier.get("X"), Some(&num(1.0)));

        // [X-1, X] = [1, 2]: the residual is hit before X is known.
        let list = Term::List(vec![ops::sub(var("X"), num(1.0)).unwrap(), var("X")]);
        let mut unifier = Unifier::new();
        assert!(!unify(&ground, &list, &mut unifier));
    }

    #[test]
    fn test_unify_soundness() {
        let left = Term::Atom(BeliefAtom::new("f", vec![var("X"), num(2.0), var("Y")]));
        let right = Term::Atom(BeliefAtom::new("f", vec![num(1.0), var("Z"), var("W")]));

        let mut unifier = Unifier::new();
        assert!(unify(&left, &right, &mut unifier));
        assert_eq!(
            unifier.apply(&left).unwrap(),
            unifier.apply(&right).unwrap()
        );
    }

    #[test]
    fn test_unify_rejects_residuals() {
        let sum = ops::add(var("X"), num(1.0)).unwrap();
        let mut unifier = Unifier::new();
        assert!(!unify(&sum, &num(3.0), &mut unifier));
    }

    #[test]
    fn test_anonymize() {
        let mut counter = 0;
        let term = Term::Atom(BeliefAtom::new("f", vec![var("X"), var("X"), var("_"), var("Y")]));
        let mut anon = Anonymizer::new(&mut counter);
        let result = anon.anonymize(&term).unwrap();

        let atom = result.as_atom().unwrap();
        let names: Vec<_> = atom
            .terms
            .iter()
            .map(|t| match t {
                Term::Var(v) => v.name.clone(),
                other => panic!("expected variable, got {other}"),
            })
            .collect();

        // Same source name maps to the same fresh name; `_` is untouched.
        assert_eq!(names[0], names[1]);
        assert_ne!(names[0], "X");
        assert_eq!(names[2], "_");
        assert_ne!(names[3], names[0]);
        assert_eq!(counter, 2);
    }

    #[test]
    fn test_anonymize_is_fresh_across_passes() {
        let mut counter = 0;
        let term = var("X");
        let first = Anonymizer::new(&mut counter).anonymize(&term).unwrap();
        let second = Anonymizer::new(&mut counter).anonymize(&term).unwrap();
        assert_ne!(first, second);
    }
}
