//! Smart constructors: operator application with partial evaluation.
//!
//! Every operator of the language is applied through one of these
//! constructors. Each one either computes a reduced literal or returns a
//! residual [`Term::Unary`]/[`Term::Binary`] node carrying the unsimplified
//! shape. The contract is to never lose information: a residual, evaluated
//! later under a more specific unifier, yields the same result as building
//! the expression from already-substituted operands.
//!
//! Domain errors (e.g. adding a string to a list) indicate a malformed
//! program and abort load-time validation.

use crate::error::TermError;
use crate::term::{BeliefAtom, BinaryOp, Term, TermTag, UnaryOp};
use crate::unify::{unify, Unifier};

fn is_binary_arithmetic_tag(tag: TermTag) -> bool {
    matches!(
        tag,
        TermTag::Add
            | TermTag::Sub
            | TermTag::Pow
            | TermTag::Mul
            | TermTag::Div
            | TermTag::IDiv
            | TermTag::Mod
    )
}

/// Operands admissible for `&` and `|`: anything that evaluates to a
/// boolean, plus belief atoms and variables.
fn is_logical_operand(term: &Term) -> bool {
    matches!(term.tag(), TermTag::Bool | TermTag::Atom | TermTag::Var)
        || term.tag().is_logical_residual()
}

/// Unary `+`.
pub fn pos(operand: Term) -> Result<Term, TermError> {
    match operand.tag() {
        TermTag::Var => Ok(Term::Unary(UnaryOp::Pos, Box::new(operand))),
        TermTag::Num => Ok(operand),
        tag if tag.is_arithmetic_residual() => Ok(operand),
        _ => Err(TermError::unary(UnaryOp::Pos, operand)),
    }
}

/// Unary `-`.
pub fn neg(operand: Term) -> Result<Term, TermError> {
    match operand {
        Term::Num(v) => Ok(Term::Num(-v)),
        // Double negation collapses.
        Term::Unary(UnaryOp::Neg, inner) => pos(*inner),
        other
            if other.tag() == TermTag::Var || other.tag().is_arithmetic_residual() =>
        {
            Ok(Term::Unary(UnaryOp::Neg, Box::new(other)))
        }
        other => Err(TermError::unary(UnaryOp::Neg, other)),
    }
}

/// Logical `not`.
///
/// Comparisons are rewritten to their duals; a double negation is only
/// collapsed around another negation, since under negation-as-failure
/// `not not x` is not equivalent to `x` for bindings.
pub fn not(operand: Term) -> Result<Term, TermError> {
    match operand {
        Term::Bool(b) => Ok(Term::Bool(!b)),
        Term::Unary(UnaryOp::Not, inner) => {
            if matches!(*inner, Term::Unary(UnaryOp::Not, _)) {
                Ok(*inner)
            } else {
                Ok(Term::Unary(
                    UnaryOp::Not,
                    Box::new(Term::Unary(UnaryOp::Not, inner)),
                ))
            }
        }
        Term::Binary(BinaryOp::Eq, left, right) => Ok(Term::Binary(BinaryOp::Neq, left, right)),
        Term::Binary(BinaryOp::Neq, left, right) => Ok(Term::Binary(BinaryOp::Eq, left, right)),
        Term::Binary(BinaryOp::Lt, left, right) => Ok(Term::Binary(BinaryOp::Lte, right, left)),
        Term::Binary(BinaryOp::Lte, left, right) => Ok(Term::Binary(BinaryOp::Lt, right, left)),
        other
            if matches!(
                other.tag(),
                TermTag::Var
                    | TermTag::Atom
                    | TermTag::And
                    | TermTag::Or
                    | TermTag::Unify
                    | TermTag::Deconstruct
            ) =>
        {
            Ok(Term::Unary(UnaryOp::Not, Box::new(other)))
        }
        other => Err(TermError::unary(UnaryOp::Not, other)),
    }
}

/// Left operand of an arithmetic operator: strips a unary `+`, passes
/// numbers, variables, negations, and arithmetic residuals through.
fn arithmetic_lhs(op: BinaryOp, left: Term, right: &Term) -> Result<Term, TermError> {
    match left {
        Term::Unary(UnaryOp::Pos, inner) => Ok(*inner),
        other
            if matches!(other.tag(), TermTag::Num | TermTag::Var | TermTag::Neg)
                || is_binary_arithmetic_tag(other.tag()) =>
        {
            Ok(other)
        }
        other => Err(TermError::binary(op, other, right.clone())),
    }
}

fn arithmetic(
    op: BinaryOp,
    left: Term,
    right: Term,
    eval: fn(f64, f64) -> f64,
) -> Result<Term, TermError> {
    if let (Term::Num(a), Term::Num(b)) = (&left, &right) {
        return Ok(Term::Num(eval(*a, *b)));
    }

    let lhs = arithmetic_lhs(op, left, &right)?;
    let rhs = match right {
        Term::Unary(UnaryOp::Pos, inner) => *inner,
        Term::Unary(UnaryOp::Neg, inner) => {
            // a + (-b) = a - b and a - (-b) = a + b; the other operators
            // keep the negated operand.
            return Ok(match op {
                BinaryOp::Add => Term::Binary(BinaryOp::Sub, Box::new(lhs), inner),
                BinaryOp::Sub => Term::Binary(BinaryOp::Add, Box::new(lhs), inner),
                _ => Term::Binary(
                    op,
                    Box::new(lhs),
                    Box::new(Term::Unary(UnaryOp::Neg, inner)),
                ),
            });
        }
        other
            if matches!(other.tag(), TermTag::Num | TermTag::Var)
                || is_binary_arithmetic_tag(other.tag()) =>
        {
            other
        }
        other => return Err(TermError::binary(op, lhs, other)),
    };

    Ok(Term::Binary(op, Box::new(lhs), Box::new(rhs)))
}

/// Binary `+`.
pub fn add(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::Add, left, right, |a, b| a + b)
}

/// Binary `-`.
pub fn sub(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::Sub, left, right, |a, b| a - b)
}

/// `**`.
pub fn pow(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::Pow, left, right, f64::powf)
}

/// `*`.
pub fn mul(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::Mul, left, right, |a, b| a * b)
}

/// `/`.
pub fn div(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::Div, left, right, |a, b| a / b)
}

/// `div` — floored integer division.
pub fn idiv(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::IDiv, left, right, |a, b| (a / b).floor())
}

/// `mod` — IEEE remainder with the sign of the dividend.
pub fn modulo(left: Term, right: Term) -> Result<Term, TermError> {
    arithmetic(BinaryOp::Mod, left, right, |a, b| a % b)
}

/// `&`.
///
/// A `true` side is dropped only when the other side is not a bare
/// variable; `X & true` must stay residual to preserve the binding intent
/// of the variable goal.
pub fn and(left: Term, right: Term) -> Result<Term, TermError> {
    if !is_logical_operand(&left) || !is_logical_operand(&right) {
        return Err(TermError::binary(BinaryOp::And, left, right));
    }

    if let Term::Bool(b) = &left {
        if !b {
            return Ok(Term::Bool(false));
        }
        if right.tag() != TermTag::Var {
            return Ok(right);
        }
    }

    if let Term::Bool(b) = &right {
        if !b {
            return Ok(Term::Bool(false));
        }
        if left.tag() != TermTag::Var {
            return Ok(left);
        }
    }

    Ok(Term::Binary(BinaryOp::And, Box::new(left), Box::new(right)))
}

/// `|`.
pub fn or(left: Term, right: Term) -> Result<Term, TermError> {
    if !is_logical_operand(&left) || !is_logical_operand(&right) {
        return Err(TermError::binary(BinaryOp::Or, left, right));
    }

    if let Term::Bool(b) = &left {
        if *b {
            return Ok(Term::Bool(true));
        }
        if right.tag() != TermTag::Var {
            return Ok(right);
        }
    }

    if let Term::Bool(b) = &right {
        if *b {
            return Ok(Term::Bool(true));
        }
        if left.tag() != TermTag::Var {
            return Ok(left);
        }
    }

    Ok(Term::Binary(BinaryOp::Or, Box::new(left), Box::new(right)))
}

/// Whether a `\==` over these operands must stay residual: either side is
/// a variable, or both sides belong to the same not-yet-decided class
/// (boolean-valued or numeric-valued).
fn neq_stays_residual(left: &Term, right: &Term) -> bool {
    let (lt, rt) = (left.tag(), right.tag());
    if lt == TermTag::Var || rt == TermTag::Var {
        return true;
    }
    let boolean = |t: TermTag| t == TermTag::Bool || t.is_logical_residual();
    let numeric = |t: TermTag| t == TermTag::Num || t.is_arithmetic_residual();
    (boolean(lt) && boolean(rt)) || (numeric(lt) && numeric(rt))
}

fn pairwise_neq(left: Vec<Term>, right: Vec<Term>) -> Result<Term, TermError> {
    let mut result = Term::Bool(false);
    for (l, r) in left.into_iter().zip(right) {
        result = or(result, neq(l, r)?)?;
    }
    Ok(result)
}

/// `\==` — structural disequality.
///
/// Equal-typed literals compare directly; lists and atoms of equal shape
/// fold a disjunction of element disequalities; mismatched concrete types
/// are trivially unequal; anything involving a variable or an undecided
/// residual stays residual.
pub fn neq(left: Term, right: Term) -> Result<Term, TermError> {
    match (left, right) {
        (Term::Bool(a), Term::Bool(b)) => Ok(Term::Bool(a != b)),
        (Term::Num(a), Term::Num(b)) => Ok(Term::Bool(a != b)),
        (Term::Str(a), Term::Str(b)) => Ok(Term::Bool(a != b)),
        (Term::List(a), Term::List(b)) => {
            if a.len() != b.len() {
                Ok(Term::Bool(true))
            } else {
                pairwise_neq(a, b)
            }
        }
        (Term::Atom(a), Term::Atom(b)) => {
            if a.functor != b.functor || a.arity() != b.arity() {
                Ok(Term::Bool(true))
            } else {
                pairwise_neq(a.terms, b.terms)
            }
        }
        (Term::Var(a), Term::Var(b)) if a.name == b.name => Ok(Term::Bool(false)),
        (l, r) => {
            if neq_stays_residual(&l, &r) {
                Ok(Term::Binary(BinaryOp::Neq, Box::new(l), Box::new(r)))
            } else {
                Ok(Term::Bool(true))
            }
        }
    }
}

/// `==`, defined as `not (left \== right)`.
pub fn eq(left: Term, right: Term) -> Result<Term, TermError> {
    not(neq(left, right)?)
}

/// Lexicographic fold for `<` over element sequences of equal length:
/// `or(result, and(equal_so_far, l < r))`, threading `equal_so_far`.
fn lexicographic_lt(left: Vec<Term>, right: Vec<Term>) -> Result<Term, TermError> {
    let mut result = Term::Bool(false);
    let mut equal_so_far = Term::Bool(true);
    for (l, r) in left.into_iter().zip(right) {
        result = or(
            result,
            and(equal_so_far.clone(), lt(l.clone(), r.clone())?)?,
        )?;
        equal_so_far = and(equal_so_far, eq(l, r)?)?;
    }
    Ok(result)
}

/// `<` — total structural order.
///
/// Unequal tags compare by tag order (residuals rank with the type they
/// evaluate to, so e.g. a string is always greater than an unevaluated
/// sum); equal tags compare by value.
pub fn lt(left: Term, right: Term) -> Result<Term, TermError> {
    match (left, right) {
        (Term::Bool(a), Term::Bool(b)) => Ok(Term::Bool(a < b)),
        (Term::Num(a), Term::Num(b)) => Ok(Term::Bool(a < b)),
        (Term::Str(a), Term::Str(b)) => Ok(Term::Bool(a < b)),
        (Term::List(a), Term::List(b)) => {
            if a.len() != b.len() {
                Ok(Term::Bool(a.len() < b.len()))
            } else {
                lexicographic_lt(a, b)
            }
        }
        (Term::Atom(a), Term::Atom(b)) => {
            if a.functor != b.functor {
                Ok(Term::Bool(a.functor < b.functor))
            } else if a.arity() != b.arity() {
                Ok(Term::Bool(a.arity() < b.arity()))
            } else {
                lexicographic_lt(a.terms, b.terms)
            }
        }
        (Term::Var(a), Term::Var(b)) if a.name == b.name => Ok(Term::Bool(false)),
        (l, r) => match (l.tag().comparison_rank(), r.tag().comparison_rank()) {
            (Some(lr), Some(rr)) if lr != rr => Ok(Term::Bool(lr < rr)),
            _ => Ok(Term::Binary(BinaryOp::Lt, Box::new(l), Box::new(r))),
        },
    }
}

/// `<=`, defined as `(left < right) | (left == right)`.
pub fn lte(left: Term, right: Term) -> Result<Term, TermError> {
    or(lt(left.clone(), right.clone())?, eq(left, right)?)
}

/// `=` — the unification operator.
///
/// If both sides are unifiable right now, the unification is attempted
/// against an empty unifier: failure reduces to `false`, an unconditional
/// success to `true`. A success that would bind variables stays residual
/// so the bindings are realized later by the goal engine, which owns the
/// in-flight unifier. A side like `X + 1` is not unifiable yet but may
/// become so once `X` is known, so it stays residual too.
pub fn unifies(left: Term, right: Term) -> Result<Term, TermError> {
    if left.is_unifiable() && right.is_unifiable() {
        let mut unifier = Unifier::new();
        if !unify(&left, &right, &mut unifier) {
            return Ok(Term::Bool(false));
        }
        if unifier.is_empty() {
            return Ok(Term::Bool(true));
        }
    }

    Ok(Term::Binary(BinaryOp::Unify, Box::new(left), Box::new(right)))
}

/// `=..` — atom deconstruction.
///
/// `f(a, b) =.. [f, [a, b]]`. A concrete atom on the left rewrites to the
/// corresponding unification over the two-element list. A variable on the
/// left is accepted as residual when the right side is a well-shaped list
/// (or still a variable); shape violations reduce to `false`, type
/// violations raise.
pub fn deconstruct(left: Term, right: Term) -> Result<Term, TermError> {
    match left {
        Term::Atom(atom) => match right.tag() {
            TermTag::List | TermTag::Var => {
                let functor = Term::Atom(BeliefAtom::nullary(atom.functor));
                let parts = Term::List(vec![functor, Term::List(atom.terms)]);
                unifies(parts, right)
            }
            _ => Err(TermError::binary(
                BinaryOp::Deconstruct,
                Term::Atom(atom),
                right,
            )),
        },
        Term::Var(var) => {
            match &right {
                Term::Var(_) => {}
                Term::List(items) => {
                    if items.len() != 2 {
                        return Ok(Term::Bool(false));
                    }
                    match &items[0] {
                        Term::Atom(atom) if atom.arity() == 0 => {}
                        Term::Var(_) => {}
                        _ => return Ok(Term::Bool(false)),
                    }
                    match &items[1] {
                        Term::List(_) | Term::Var(_) => {}
                        _ => return Ok(Term::Bool(false)),
                    }
                }
                _ => {
                    return Err(TermError::binary(
                        BinaryOp::Deconstruct,
                        Term::Var(var),
                        right,
                    ));
                }
            }

            Ok(Term::Binary(
                BinaryOp::Deconstruct,
                Box::new(Term::Var(var)),
                Box::new(right),
            ))
        }
        other => Err(TermError::binary(BinaryOp::Deconstruct, other, right)),
    }
}

impl UnaryOp {
    /// Applies the operator through its smart constructor.
    pub fn apply(self, operand: Term) -> Result<Term, TermError> {
        match self {
            UnaryOp::Pos => pos(operand),
            UnaryOp::Neg => neg(operand),
            UnaryOp::Not => not(operand),
        }
    }
}

impl BinaryOp {
    /// Applies the operator through its smart constructor.
    pub fn apply(self, left: Term, right: Term) -> Result<Term, TermError> {
        match self {
            BinaryOp::Add => add(left, right),
            BinaryOp::Sub => sub(left, right),
            BinaryOp::Pow => pow(left, right),
            BinaryOp::Mul => mul(left, right),
            BinaryOp::Div => div(left, right),
            BinaryOp::IDiv => idiv(left, right),
            BinaryOp::Mod => modulo(left, right),
            BinaryOp::And => and(left, right),
            BinaryOp::Or => or(left, right),
            BinaryOp::Unify => unifies(left, right),
            BinaryOp::Deconstruct => deconstruct(left, right),
            BinaryOp::Eq => eq(left, right),
            BinaryOp::Neq => neq(left, right),
            BinaryOp::Lt => lt(left, right),
            BinaryOp::Lte => lte(left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Variable;

    fn var(name: &str) -> Term {
        Term::Var(Variable::new(name))
    }

    fn num(v: f64) -> Term {
        Term::Num(v)
    }

    #[test]
    fn test_numeric_evaluation() {
        assert_eq!(add(num(1.0), num(2.0)).unwrap(), num(3.0));
        assert_eq!(sub(num(1.0), num(2.0)).unwrap(), num(-1.0));
        assert_eq!(mul(num(3.0), num(2.0)).unwrap(), num(6.0));
        assert_eq!(div(num(3.0), num(2.0)).unwrap(), num(1.5));
        assert_eq!(idiv(num(7.0), num(2.0)).unwrap(), num(3.0));
        assert_eq!(modulo(num(7.0), num(2.0)).unwrap(), num(1.0));
        assert_eq!(pow(num(2.0), num(10.0)).unwrap(), num(1024.0));
    }

    #[test]
    fn test_comparison_of_sums() {
        // 1 + 2 < 1 ** 2 reduces all the way to false.
        let expr = lt(
            add(num(1.0), num(2.0)).unwrap(),
            pow(num(1.0), num(2.0)).unwrap(),
        )
        .unwrap();
        assert_eq!(expr, Term::Bool(false));
    }

    #[test]
    fn test_negation_rules() {
        assert_eq!(neg(num(2.0)).unwrap(), num(-2.0));

        let neg_x = neg(var("X")).unwrap();
        assert_eq!(neg_x.tag(), TermTag::Neg);
        // -(-X) collapses to +X.
        let double = neg(neg_x).unwrap();
        assert_eq!(double.tag(), TermTag::Pos);

        assert!(neg(Term::from("s")).is_err());
        assert!(pos(Term::Bool(true)).is_err());
    }

    #[test]
    fn test_sum_with_negated_operand() {
        // a + (-b) rewrites to a - b, and a - (-b) to a + b.
        let e = add(var("A"), neg(var("B")).unwrap()).unwrap();
        assert_eq!(e.tag(), TermTag::Sub);
        let e = sub(var("A"), neg(var("B")).unwrap()).unwrap();
        assert_eq!(e.tag(), TermTag::Add);
        // Unary plus is stripped on both sides.
        let e = add(pos(var("A")).unwrap(), pos(var("B")).unwrap()).unwrap();
        assert_eq!(e, Term::Binary(BinaryOp::Add, Box::new(var("A")), Box::new(var("B"))));
    }

    #[test]
    fn test_not_rules() {
        assert_eq!(not(Term::Bool(true)).unwrap(), Term::Bool(false));

        let eq_term = Term::Binary(BinaryOp::Eq, Box::new(var("X")), Box::new(num(1.0)));
        assert_eq!(not(eq_term).unwrap().tag(), TermTag::Neq);

        let lt_term = Term::Binary(BinaryOp::Lt, Box::new(var("X")), Box::new(num(1.0)));
        let flipped = not(lt_term).unwrap();
        // not (X < 1) becomes 1 <= X.
        assert_eq!(
            flipped,
            Term::Binary(BinaryOp::Lte, Box::new(num(1.0)), Box::new(var("X")))
        );

        assert!(not(num(1.0)).is_err());
    }

    #[test]
    fn test_and_short_circuit() {
        let atom = Term::Atom(BeliefAtom::nullary("p"));
        assert_eq!(and(Term::Bool(true), atom.clone()).unwrap(), atom);
        assert_eq!(
            and(atom.clone(), Term::Bool(false)).unwrap(),
            Term::Bool(false)
        );
        // true & X keeps the variable goal.
        let kept = and(Term::Bool(true), var("X")).unwrap();
        assert_eq!(kept.tag(), TermTag::And);
        assert!(and(num(1.0), atom).is_err());
    }

    #[test]
    fn test_or_short_circuit() {
        let atom = Term::Atom(BeliefAtom::nullary("p"));
        assert_eq!(or(Term::Bool(true), atom.clone()).unwrap(), Term::Bool(true));
        assert_eq!(or(Term::Bool(false), atom.clone()).unwrap(), atom);
        let kept = or(Term::Bool(false), var("X")).unwrap();
        assert_eq!(kept.tag(), TermTag::Or);
    }

    #[test]
    fn test_belief_atom_total_order() {
        let p = Term::Atom(BeliefAtom::new("foo", vec![num(1.0), Term::Bool(false)]));
        let q = Term::Atom(BeliefAtom::new("foo", vec![num(1.0), Term::Bool(true)]));

        assert_eq!(eq(p.clone(), q.clone()).unwrap(), Term::Bool(false));
        assert_eq!(lt(p.clone(), q.clone()).unwrap(), Term::Bool(true));
        assert_eq!(lte(p.clone(), q.clone()).unwrap(), Term::Bool(true));
        assert_eq!(lte(q, p).unwrap(), Term::Bool(false));
    }

    #[test]
    fn test_bool_comparison() {
        assert_eq!(
            eq(Term::Bool(true), Term::Bool(true)).unwrap(),
            Term::Bool(true)
        );
        assert_eq!(
            eq(Term::Bool(true), Term::Bool(false)).unwrap(),
            Term::Bool(false)
        );
    }

    #[test]
    fn test_cross_type_order_is_decided_for_residuals() {
        // An unevaluated sum is numeric-valued, so it is below any string.
        let sum = add(var("X"), num(1.0)).unwrap();
        assert_eq!(lt(sum.clone(), Term::from("s")).unwrap(), Term::Bool(true));
        // And a boolean-valued residual is below a numeric-valued one.
        let cmp = Term::Binary(BinaryOp::Lt, Box::new(var("X")), Box::new(num(1.0)));
        assert_eq!(lt(cmp, sum.clone()).unwrap(), Term::Bool(true));
        assert_eq!(lt(sum.clone(), num(3.0)).unwrap().tag(), TermTag::Lt);
        assert_eq!(neq(sum, Term::from("s")).unwrap(), Term::Bool(true));
    }

    #[test]
    fn test_ungrounded_atom_equality_stays_residual() {
        let t_of_x = Term::Atom(BeliefAtom::new("t", vec![var("X")]));
        let t_of_five = Term::Atom(BeliefAtom::new("t", vec![num(5.0)]));

        let result = eq(t_of_x, t_of_five).unwrap();
        // not (X \== 5) is an Eq residual over the element pair.
        match result {
            Term::Binary(BinaryOp::Eq, _, right) => assert_eq!(*right, num(5.0)),
            other => panic!("expected Eq residual, got {other}"),
        }
    }

    #[test]
    fn test_unify_op_reduction() {
        let a = Term::Atom(BeliefAtom::nullary("a"));
        assert_eq!(unifies(a.clone(), a.clone()).unwrap(), Term::Bool(true));
        assert_eq!(
            unifies(a.clone(), Term::Atom(BeliefAtom::nullary("b"))).unwrap(),
            Term::Bool(false)
        );
        // Binding success stays residual for the goal engine.
        assert_eq!(unifies(var("X"), a).unwrap().tag(), TermTag::Unify);
        // A not-yet-unifiable side stays residual as well.
        let sum = add(var("Y"), num(1.0)).unwrap();
        assert_eq!(unifies(var("X"), sum).unwrap().tag(), TermTag::Unify);
    }

    #[test]
    fn test_deconstruct_concrete_atom() {
        let atom = Term::Atom(BeliefAtom::new("f", vec![num(1.0), num(2.0)]));
        let pattern = Term::List(vec![
            Term::Atom(BeliefAtom::nullary("f")),
            Term::List(vec![num(1.0), num(2.0)]),
        ]);
        assert_eq!(deconstruct(atom, pattern).unwrap(), Term::Bool(true));
    }

    #[test]
    fn test_deconstruct_shapes() {
        let good = Term::List(vec![
            Term::Atom(BeliefAtom::nullary("g")),
            Term::List(vec![num(1.0)]),
        ]);
        assert_eq!(
            deconstruct(var("X"), good).unwrap().tag(),
            TermTag::Deconstruct
        );

        let bad = Term::List(vec![num(1.0), Term::List(vec![])]);
        assert_eq!(deconstruct(var("X"), bad).unwrap(), Term::Bool(false));

        assert!(deconstruct(var("X"), num(1.0)).is_err());
        assert!(deconstruct(num(1.0), var("X")).is_err());
    }

    #[test]
    fn test_residual_preserves_information() {
        // Constructing with a free variable and substituting later gives
        // the same result as constructing from substituted operands.
        let residual = add(var("X"), num(2.0)).unwrap();
        let mut unifier = Unifier::new();
        unifier.insert("X", num(40.0));
        let late = unifier.apply(&residual).unwrap();
        let early = add(num(40.0), num(2.0)).unwrap();
        assert_eq!(late, early);
    }
}
