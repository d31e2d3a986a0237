//! The step interpreter: advances one agent by one atomic action.
//!
//! Each call to [`Interpreter::step`] performs a bounded amount of work on
//! the front intention — one plan-selection scan, one intention pop, or
//! one plan-body formula — and returns whether any intention remains. The
//! driver round-robins `step` across agents, so the interleaving between
//! agents is per-formula.

use std::collections::VecDeque;

use aspeak_core::{
    unify, Agent, Anonymizer, FormulaKind, GoalKind, IntentionFrame, Term, Unifier,
};

use crate::consequence::consequence;
use crate::environment::Environment;
use crate::error::RuntimeError;

/// The interpreter owns nothing but the counter backing variable
/// anonymization, so one interpreter can drive any number of agents
/// deterministically.
#[derive(Debug, Default)]
pub struct Interpreter {
    anon_counter: u64,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::default()
    }

    /// Advances the agent by one step.
    ///
    /// Returns `Ok(true)` while more work remains. Semantic runtime
    /// errors (no plan for an achievement goal, malformed belief
    /// additions, reserved formula kinds) are fatal and propagate.
    pub fn step(&mut self, env: &Environment, agent: &mut Agent) -> Result<bool, RuntimeError> {
        if agent.intents.is_empty() {
            return Ok(false);
        }

        // A finished intention is popped as its own step.
        if agent.intents.front().is_some_and(|intent| intent.is_empty()) {
            agent.intents.pop_front();
            return Ok(true);
        }

        let (external, trigger_kind, goal_kind, trigger) = {
            let frame = &agent.intents[0][0];
            (
                frame.is_external(),
                frame.trigger_kind,
                frame.goal_kind,
                frame.trigger.clone(),
            )
        };

        if external {
            // Scan plans in source order; the first one whose head
            // unifies and whose context has a solution wins.
            let mut selected = None;
            for (index, plan) in agent.plans.iter().enumerate() {
                if plan.trigger != trigger_kind || plan.goal != goal_kind {
                    continue;
                }

                let mut unifier = Unifier::new();
                if !unify(
                    &Term::Atom(plan.head.clone()),
                    &Term::Atom(trigger.clone()),
                    &mut unifier,
                ) {
                    continue;
                }

                let mut generator = consequence(env, agent, &plan.context, &unifier)?;
                if let Some(solution) = generator.first_solution()? {
                    selected = Some((index, solution));
                    break;
                }
            }

            match selected {
                Some((index, unifier)) => {
                    tracing::debug!(
                        agent = %agent.name,
                        plan = index,
                        trigger = %trigger,
                        "selected plan"
                    );
                    let frame = &mut agent.intents[0][0];
                    frame.plan = Some(index);
                    frame.body_pos = 0;
                    frame.unifier = unifier;
                }
                None => {
                    if goal_kind == GoalKind::Achieve {
                        agent.intents.pop_front();
                        return Err(RuntimeError::NoApplicablePlan {
                            functor: trigger.functor,
                        });
                    }
                    tracing::debug!(
                        agent = %agent.name,
                        trigger = %trigger,
                        "no plan for event"
                    );
                    if let Some(intent) = agent.intents.front_mut() {
                        intent.pop_front();
                    }
                    return Ok(true);
                }
            }
        }

        let (plan_index, body_pos) = {
            let frame = &agent.intents[0][0];
            match frame.plan {
                Some(index) => (index, frame.body_pos),
                // Selection either stored a plan or returned above.
                None => return Ok(true),
            }
        };

        if body_pos >= agent.plans[plan_index].body.len() {
            return self.complete_frame(agent);
        }

        let formula = agent.plans[plan_index].body[body_pos].clone();
        // Advance the cursor before dispatch; pushes below put new frames
        // or intentions in front of the executing frame, not in place of
        // it, and the completed-frame unification reads `body_pos - 1`.
        agent.intents[0][0].body_pos += 1;

        match formula.kind {
            FormulaKind::Term => {
                let base = agent.intents[0][0].unifier.clone();
                let solution = {
                    let mut generator = consequence(env, agent, &formula.term, &base)?;
                    generator.first_solution()?
                };

                match solution {
                    Some(unifier) => agent.intents[0][0].unifier = unifier,
                    None => {
                        let rendered = base
                            .apply(&formula.term)
                            .map(|term| term.to_string())
                            .unwrap_or_else(|_| formula.term.to_string());
                        tracing::warn!(
                            agent = %agent.name,
                            formula = %rendered,
                            "assertion or action failure, aborting intention"
                        );
                        agent.intents.pop_front();
                    }
                }
            }
            FormulaKind::Replace => {
                let unifier = agent.intents[0][0].unifier.clone();
                let term = unifier.apply(&formula.term)?;
                agent.remove_beliefs(&term);
                self.add_belief(agent, term)?;
            }
            FormulaKind::Add => {
                let unifier = agent.intents[0][0].unifier.clone();
                let term = unifier.apply(&formula.term)?;
                self.add_belief(agent, term)?;
            }
            FormulaKind::Remove => {
                let unifier = agent.intents[0][0].unifier.clone();
                let pattern = unifier.apply(&formula.term)?;
                tracing::debug!(agent = %agent.name, pattern = %pattern, "removing beliefs");
                agent.remove_beliefs(&pattern);
            }
            FormulaKind::Achieve => {
                let unifier = agent.intents[0][0].unifier.clone();
                let goal = unifier.apply(&formula.term)?;
                let goal = Anonymizer::new(&mut self.anon_counter).anonymize(&goal)?;

                let atom = match goal {
                    Term::Atom(atom) => atom,
                    other => {
                        return Err(RuntimeError::NonAtomGoal {
                            term: other.to_string(),
                        });
                    }
                };

                tracing::debug!(agent = %agent.name, goal = %atom, "pushing sub-goal");
                agent.intents[0].push_front(IntentionFrame::achievement(atom));
            }
            FormulaKind::AchieveLater => {
                return Err(RuntimeError::UnimplementedFormula { kind: "!!" });
            }
            FormulaKind::Test => {
                return Err(RuntimeError::UnimplementedFormula { kind: "?" });
            }
        }

        Ok(true)
    }

    /// Pops a completed frame, handing its bindings back to the caller
    /// frame by unifying the completed trigger against the caller's
    /// just-executed formula.
    fn complete_frame(&mut self, agent: &mut Agent) -> Result<bool, RuntimeError> {
        let intent = &mut agent.intents[0];
        let Some(frame) = intent.pop_front() else {
            return Ok(true);
        };

        let completed = frame.unifier.apply(&Term::Atom(frame.trigger))?;
        let completed = Anonymizer::new(&mut self.anon_counter).anonymize(&completed)?;

        if let Some(caller) = intent.front_mut() {
            if let Some(caller_plan) = caller.plan {
                if caller.body_pos > 0 {
                    let formula = &agent.plans[caller_plan].body[caller.body_pos - 1].term;
                    let caller_goal = caller.unifier.apply(formula)?;
                    // A mismatch only means no bindings travel back.
                    let _ = unify(&caller_goal, &completed, &mut caller.unifier);
                }
            }
        }

        Ok(true)
    }

    /// Adds a ground belief atom and pushes the matching event intention
    /// to the front of the queue.
    fn add_belief(&mut self, agent: &mut Agent, term: Term) -> Result<(), RuntimeError> {
        let atom = match term {
            Term::Atom(atom) => atom,
            other => {
                return Err(RuntimeError::NonAtomBelief {
                    term: other.to_string(),
                });
            }
        };

        if !atom.is_ground() {
            return Err(RuntimeError::NonGroundBelief {
                term: atom.to_string(),
            });
        }

        tracing::debug!(agent = %agent.name, belief = %atom, "adding belief");
        agent.beliefs.push(atom.clone());
        agent
            .intents
            .push_front(VecDeque::from([IntentionFrame::belief_event(atom)]));
        Ok(())
    }
}
