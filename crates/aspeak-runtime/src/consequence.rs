//! The logical-consequence engine: lazy, backtracking generators of
//! unifiers under which a goal term follows from the agent's state.
//!
//! [`consequence`] applies the incoming unifier to the goal (which may
//! reduce it through the smart constructors) and then dispatches on the
//! root shape to one generator variant per shape. Generators are pull
//! based: `next` produces one solution or reports exhaustion, `current`
//! reads the solution's unifier.
//!
//! Ordering is deterministic: belief enumeration follows insertion order,
//! built-in actions are tried before beliefs, `|` is strictly left then
//! right, and `&` iterates the right side per left solution.

use aspeak_core::{unify, Agent, BeliefAtom, BinaryOp, Term, UnaryOp, Unifier, Variable};

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::registry::ActionGenerator;

/// A generator of unifiers for one goal, one variant per goal shape.
pub enum GoalGen<'a> {
    Bool(BoolGen),
    Var(VarGen<'a>),
    Atom(AtomGen<'a>),
    Not(NotGen<'a>),
    And(AndGen<'a>),
    Or(OrGen<'a>),
    Unify(UnifyGen),
    Deconstruct(DeconstructGen),
}

impl<'a> GoalGen<'a> {
    /// Requests the next solution.
    pub fn next(&mut self) -> Result<bool, RuntimeError> {
        match self {
            GoalGen::Bool(gen) => Ok(gen.next()),
            GoalGen::Var(gen) => Ok(gen.next()),
            GoalGen::Atom(gen) => gen.next(),
            GoalGen::Not(gen) => gen.next(),
            GoalGen::And(gen) => gen.next(),
            GoalGen::Or(gen) => gen.next(),
            GoalGen::Unify(gen) => Ok(gen.next()),
            GoalGen::Deconstruct(gen) => Ok(gen.next()),
        }
    }

    /// The current solution; only meaningful after `next` returned
    /// `Ok(true)`.
    pub fn current(&self) -> Unifier {
        match self {
            GoalGen::Bool(gen) => gen.unifier.clone(),
            GoalGen::Var(gen) => gen.current.clone(),
            GoalGen::Atom(gen) => gen.current(),
            GoalGen::Not(gen) => gen.unifier.clone(),
            GoalGen::And(gen) => gen.current(),
            GoalGen::Or(gen) => gen.current(),
            GoalGen::Unify(gen) => gen.current.clone(),
            GoalGen::Deconstruct(gen) => gen.unifier.clone(),
        }
    }

    /// Drives the generator to its first solution, if any.
    pub fn first_solution(&mut self) -> Result<Option<Unifier>, RuntimeError> {
        if self.next()? {
            Ok(Some(self.current()))
        } else {
            Ok(None)
        }
    }
}

/// Builds a generator for `goal` under `unifier`.
///
/// The unifier is applied first, so a goal like `X < 5` with `X` bound
/// reduces to a boolean before dispatch.
pub fn consequence<'a>(
    env: &'a Environment,
    agent: &'a Agent,
    goal: &Term,
    unifier: &Unifier,
) -> Result<GoalGen<'a>, RuntimeError> {
    let substituted = unifier.apply(goal)?;
    substituted_consequence(env, agent, substituted, unifier.clone())
}

/// Dispatches an already-substituted goal to its generator.
fn substituted_consequence<'a>(
    env: &'a Environment,
    agent: &'a Agent,
    goal: Term,
    unifier: Unifier,
) -> Result<GoalGen<'a>, RuntimeError> {
    Ok(match goal {
        Term::Bool(value) => GoalGen::Bool(BoolGen {
            pending: value,
            unifier,
        }),
        Term::Var(var) => GoalGen::Var(VarGen {
            name: var.name,
            beliefs: &agent.beliefs,
            index: 0,
            tried_true: false,
            current: unifier,
        }),
        Term::Atom(atom) => {
            let action = env.get_action(agent, &atom, &unifier);
            GoalGen::Atom(AtomGen {
                action,
                pattern: atom,
                beliefs: &agent.beliefs,
                index: 0,
                base: unifier.clone(),
                current: unifier,
            })
        }
        Term::Unary(UnaryOp::Not, operand) => GoalGen::Not(NotGen {
            sub: Box::new(substituted_consequence(
                env,
                agent,
                *operand,
                unifier.clone(),
            )?),
            unifier,
            polled: false,
        }),
        Term::Binary(BinaryOp::And, left, right) => GoalGen::And(AndGen {
            env,
            agent,
            left: Box::new(substituted_consequence(env, agent, *left, unifier)?),
            right_term: *right,
            right: None,
            right_has_more: false,
        }),
        Term::Binary(BinaryOp::Or, left, right) => GoalGen::Or(OrGen {
            left: Box::new(substituted_consequence(
                env,
                agent,
                *left,
                unifier.clone(),
            )?),
            right: Box::new(substituted_consequence(env, agent, *right, unifier)?),
            left_done: false,
        }),
        Term::Binary(BinaryOp::Unify, left, right) => GoalGen::Unify(UnifyGen {
            left: *left,
            right: *right,
            current: unifier,
            polled: false,
        }),
        Term::Binary(BinaryOp::Deconstruct, left, right) => {
            GoalGen::Deconstruct(DeconstructGen {
                left: *left,
                right: *right,
                unifier,
                polled: false,
            })
        }
        // Arithmetic residuals and comparisons the smart constructors did
        // not reduce to a boolean fail as goals.
        _ => GoalGen::Bool(BoolGen {
            pending: false,
            unifier,
        }),
    })
}

/// `true` yields the incoming unifier once; `false` yields nothing.
pub struct BoolGen {
    pending: bool,
    unifier: Unifier,
}

impl BoolGen {
    fn next(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }
}

/// A bare variable goal: trivially true first, then bound to each belief
/// atom in insertion order.
pub struct VarGen<'a> {
    name: String,
    beliefs: &'a [BeliefAtom],
    index: usize,
    tried_true: bool,
    current: Unifier,
}

impl VarGen<'_> {
    fn next(&mut self) -> bool {
        if !self.tried_true {
            self.tried_true = true;
            self.current.insert(self.name.clone(), Term::Bool(true));
            return true;
        }

        if self.index < self.beliefs.len() {
            let belief = self.beliefs[self.index].clone();
            self.index += 1;
            self.current
                .insert(self.name.clone(), Term::Atom(belief));
            return true;
        }

        false
    }
}

/// An atom goal: defers entirely to a registered action, otherwise scans
/// beliefs with matching functor and arity.
pub struct AtomGen<'a> {
    pattern: BeliefAtom,
    action: Option<Box<dyn ActionGenerator + 'a>>,
    beliefs: &'a [BeliefAtom],
    index: usize,
    base: Unifier,
    current: Unifier,
}

impl AtomGen<'_> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        if let Some(action) = self.action.as_mut() {
            return action.next();
        }

        while self.index < self.beliefs.len() {
            let belief = &self.beliefs[self.index];
            self.index += 1;

            if belief.functor != self.pattern.functor || belief.arity() != self.pattern.arity() {
                continue;
            }

            let mut candidate = self.base.clone();
            if unify(
                &Term::Atom(self.pattern.clone()),
                &Term::Atom(belief.clone()),
                &mut candidate,
            ) {
                self.current = candidate;
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn current(&self) -> Unifier {
        match &self.action {
            Some(action) => action.current(),
            None => self.current.clone(),
        }
    }
}

/// Negation as failure: succeeds exactly once iff the sub-goal has no
/// solution, with the incoming unifier unchanged.
pub struct NotGen<'a> {
    sub: Box<GoalGen<'a>>,
    unifier: Unifier,
    polled: bool,
}

impl NotGen<'_> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        if self.polled {
            return Ok(false);
        }
        self.polled = true;
        Ok(!self.sub.next()?)
    }
}

/// Nested iteration for `&`: for each left solution, enumerate the right
/// side substituted under it.
pub struct AndGen<'a> {
    env: &'a Environment,
    agent: &'a Agent,
    left: Box<GoalGen<'a>>,
    right_term: Term,
    right: Option<Box<GoalGen<'a>>>,
    right_has_more: bool,
}

impl<'a> AndGen<'a> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        loop {
            if !self.right_has_more {
                if !self.left.next()? {
                    return Ok(false);
                }
                let left_unifier = self.left.current();
                let right_goal = left_unifier.apply(&self.right_term)?;
                self.right = Some(Box::new(substituted_consequence(
                    self.env,
                    self.agent,
                    right_goal,
                    left_unifier,
                )?));
            }

            let Some(right) = self.right.as_mut() else {
                return Ok(false);
            };
            self.right_has_more = right.next()?;
            if self.right_has_more {
                return Ok(true);
            }
        }
    }

    fn current(&self) -> Unifier {
        match &self.right {
            Some(right) => right.current(),
            None => Unifier::new(),
        }
    }
}

/// Sequential choice for `|`: exhaust the left side, then the right.
pub struct OrGen<'a> {
    left: Box<GoalGen<'a>>,
    right: Box<GoalGen<'a>>,
    left_done: bool,
}

impl<'a> OrGen<'a> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        if !self.left_done {
            if self.left.next()? {
                return Ok(true);
            }
            self.left_done = true;
        }

        self.right.next()
    }

    fn current(&self) -> Unifier {
        if self.left_done {
            self.right.current()
        } else {
            self.left.current()
        }
    }
}

/// A residual `=` goal: one unification attempt against the incoming
/// unifier.
pub struct UnifyGen {
    left: Term,
    right: Term,
    current: Unifier,
    polled: bool,
}

impl UnifyGen {
    fn next(&mut self) -> bool {
        if self.polled {
            return false;
        }
        self.polled = true;

        unify(&self.left, &self.right, &mut self.current)
    }
}

/// A residual `=..` goal: binds the left variable to the atom packed from
/// the two-element list on the right. Other shapes were already reduced
/// by the smart constructor.
pub struct DeconstructGen {
    left: Term,
    right: Term,
    unifier: Unifier,
    polled: bool,
}

impl DeconstructGen {
    fn next(&mut self) -> bool {
        if self.polled {
            return false;
        }
        self.polled = true;

        let Term::Var(Variable { name }) = &self.left else {
            return false;
        };

        let Term::List(items) = &self.right else {
            return false;
        };
        if items.len() != 2 {
            return false;
        }

        let Term::Atom(functor) = &items[0] else {
            return false;
        };
        if functor.arity() != 0 {
            return false;
        }

        let Term::List(args) = &items[1] else {
            return false;
        };

        let atom = BeliefAtom::new(functor.functor.clone(), args.clone());
        self.unifier.insert(name.clone(), Term::Atom(atom));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspeak_core::ops;
    use std::io;

    fn var(name: &str) -> Term {
        Term::Var(Variable::new(name))
    }

    fn quiet_env() -> Environment {
        Environment::with_sink(Box::new(io::sink()))
    }

    fn solutions(env: &Environment, agent: &Agent, goal: &Term) -> Vec<Unifier> {
        let mut gen = consequence(env, agent, goal, &Unifier::new()).unwrap();
        let mut result = Vec::new();
        while gen.next().unwrap() {
            result.push(gen.current());
        }
        result
    }

    #[test]
    fn test_bool_goals() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        assert_eq!(solutions(&env, &agent, &Term::Bool(true)).len(), 1);
        assert!(solutions(&env, &agent, &Term::Bool(false)).is_empty());
    }

    #[test]
    fn test_atom_goal_matches_beliefs_in_order() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![
            BeliefAtom::new("f", vec![Term::Num(5.0)]),
            BeliefAtom::new("f", vec![Term::Num(6.0)]),
            BeliefAtom::new("g", vec![Term::Num(7.0)]),
            BeliefAtom::new("f", vec![Term::Num(5.0), Term::Num(5.0)]),
        ];

        let goal = Term::Atom(BeliefAtom::new("f", vec![var("X")]));
        let found = solutions(&env, &agent, &goal);

        // Functor and arity filter the scan; insertion order is kept.
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].get("X"), Some(&Term::Num(5.0)));
        assert_eq!(found[1].get("X"), Some(&Term::Num(6.0)));
    }

    #[test]
    fn test_atom_goal_with_empty_belief_base() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        let goal = Term::Atom(BeliefAtom::new("f", vec![var("X")]));
        assert!(solutions(&env, &agent, &goal).is_empty());
    }

    #[test]
    fn test_bare_variable_goal() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![BeliefAtom::nullary("f")];

        let found = solutions(&env, &agent, &var("Y"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].get("Y"), Some(&Term::Bool(true)));
        assert_eq!(
            found[1].get("Y"),
            Some(&Term::Atom(BeliefAtom::nullary("f")))
        );
    }

    #[test]
    fn test_negation_as_failure_yields_once() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        let goal = ops::not(Term::Atom(BeliefAtom::nullary("missing"))).unwrap();
        let mut gen = consequence(&env, &agent, &goal, &Unifier::new()).unwrap();
        assert!(gen.next().unwrap());
        // The generator is exhausted after its single success.
        assert!(!gen.next().unwrap());
    }

    #[test]
    fn test_negation_fails_when_subgoal_succeeds() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![BeliefAtom::nullary("present")];

        let goal = ops::not(Term::Atom(BeliefAtom::nullary("present"))).unwrap();
        assert!(solutions(&env, &agent, &goal).is_empty());
    }

    #[test]
    fn test_or_is_left_then_right() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![
            BeliefAtom::new("a", vec![Term::Num(1.0)]),
            BeliefAtom::new("b", vec![Term::Num(2.0)]),
        ];

        let goal = ops::or(
            Term::Atom(BeliefAtom::new("a", vec![var("X")])),
            Term::Atom(BeliefAtom::new("b", vec![var("X")])),
        )
        .unwrap();

        let found = solutions(&env, &agent, &goal);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].get("X"), Some(&Term::Num(1.0)));
        assert_eq!(found[1].get("X"), Some(&Term::Num(2.0)));
    }

    #[test]
    fn test_and_iterates_right_per_left_solution() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![
            BeliefAtom::new("p", vec![Term::Num(1.0)]),
            BeliefAtom::new("p", vec![Term::Num(2.0)]),
            BeliefAtom::new("q", vec![Term::Num(2.0)]),
        ];

        // p(X) & q(X): only X = 2 satisfies both.
        let goal = ops::and(
            Term::Atom(BeliefAtom::new("p", vec![var("X")])),
            Term::Atom(BeliefAtom::new("q", vec![var("X")])),
        )
        .unwrap();

        let found = solutions(&env, &agent, &goal);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("X"), Some(&Term::Num(2.0)));
    }

    #[test]
    fn test_chained_unification_under_and() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        // A = B & B = c binds both variables to the atom, possibly
        // through the canonical alias chain.
        let c = Term::Atom(BeliefAtom::nullary("c"));
        let goal = ops::and(
            ops::unifies(var("A"), var("B")).unwrap(),
            ops::unifies(var("B"), c.clone()).unwrap(),
        )
        .unwrap();

        let mut gen = consequence(&env, &agent, &goal, &Unifier::new()).unwrap();
        assert!(gen.next().unwrap());

        let solution = gen.current();
        assert_eq!(solution.apply(&var("A")).unwrap(), c);
        assert_eq!(solution.apply(&var("B")).unwrap(), c);
    }

    #[test]
    fn test_unify_goal_tries_once() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        let goal = ops::unifies(var("X"), Term::Num(1.0)).unwrap();
        let found = solutions(&env, &agent, &goal);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("X"), Some(&Term::Num(1.0)));
    }

    #[test]
    fn test_deconstruct_goal_binds_variable() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        let goal = ops::deconstruct(
            var("X"),
            Term::List(vec![
                Term::Atom(BeliefAtom::nullary("g")),
                Term::List(vec![Term::Num(1.0), Term::Num(2.0)]),
            ]),
        )
        .unwrap();

        let found = solutions(&env, &agent, &goal);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].get("X"),
            Some(&Term::Atom(BeliefAtom::new(
                "g",
                vec![Term::Num(1.0), Term::Num(2.0)]
            )))
        );
    }

    #[test]
    fn test_actions_take_precedence_over_beliefs() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        // Even with a matching belief, a registered functor defers to the
        // action; `.fail` therefore yields nothing.
        agent.beliefs = vec![BeliefAtom::nullary(".fail")];

        let goal = Term::Atom(BeliefAtom::nullary(".fail"));
        assert!(solutions(&env, &agent, &goal).is_empty());
    }

    #[test]
    fn test_arithmetic_residual_goal_fails() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        let goal = ops::add(var("X"), Term::Num(1.0)).unwrap();
        assert!(solutions(&env, &agent, &goal).is_empty());
    }

    #[test]
    fn test_incoming_unifier_reduces_goal_before_dispatch() {
        let env = quiet_env();
        let agent = Agent::new("uno");

        let mut unifier = Unifier::new();
        unifier.insert("X", Term::Num(3.0));

        // X < 5 reduces to true under the incoming unifier.
        let goal = ops::lt(var("X"), Term::Num(5.0)).unwrap();
        let mut gen = consequence(&env, &agent, &goal, &unifier).unwrap();
        assert!(gen.next().unwrap());
        assert!(!gen.next().unwrap());
    }

    #[test]
    fn test_generator_determinism() {
        let env = quiet_env();
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![
            BeliefAtom::new("f", vec![Term::Num(1.0)]),
            BeliefAtom::new("f", vec![Term::Num(2.0)]),
        ];

        let goal = Term::Atom(BeliefAtom::new("f", vec![var("X")]));
        let first: Vec<_> = solutions(&env, &agent, &goal)
            .iter()
            .map(|u| u.apply(&var("X")).unwrap())
            .collect();
        let second: Vec<_> = solutions(&env, &agent, &goal)
            .iter()
            .map(|u| u.apply(&var("X")).unwrap())
            .collect();
        assert_eq!(first, second);
    }
}
