//! Runtime state of a single agent: the mutable belief base and the queue
//! of live intentions.

use std::collections::VecDeque;

use crate::program::{AgentProgram, GoalKind, Plan, Rule, TriggerKind};
use crate::term::{BeliefAtom, Term};
use crate::unify::{unifies_with, Unifier};

/// One frame of an intention: a triggering event together with the cursor
/// into the plan body selected for it.
///
/// A frame starts *external*: no plan has been selected yet and `plan` is
/// empty. Plan selection stores the index of the chosen plan (plans are
/// immutable and outlive every frame, so an index is a stable handle) and
/// the unifier seeded from head and context.
#[derive(Clone, Debug)]
pub struct IntentionFrame {
    pub trigger_kind: TriggerKind,
    pub goal_kind: GoalKind,
    pub trigger: BeliefAtom,
    /// Index of the selected plan into [`Agent::plans`]; `None` while the
    /// event is still waiting for plan selection.
    pub plan: Option<usize>,
    /// Cursor into the selected plan's body.
    pub body_pos: usize,
    /// Bindings accumulated while executing the body.
    pub unifier: Unifier,
}

impl IntentionFrame {
    /// A frame for an achievement goal event.
    pub fn achievement(trigger: BeliefAtom) -> Self {
        IntentionFrame {
            trigger_kind: TriggerKind::Add,
            goal_kind: GoalKind::Achieve,
            trigger,
            plan: None,
            body_pos: 0,
            unifier: Unifier::new(),
        }
    }

    /// A frame for a belief-addition event.
    pub fn belief_event(trigger: BeliefAtom) -> Self {
        IntentionFrame {
            goal_kind: GoalKind::Belief,
            ..IntentionFrame::achievement(trigger)
        }
    }

    /// Whether the frame is still waiting for plan selection.
    pub fn is_external(&self) -> bool {
        self.plan.is_none()
    }
}

/// An intention: a stack of frames, deepest sub-goal at the front.
pub type Intention = VecDeque<IntentionFrame>;

/// An agent: a name, the mutable belief base, the static program, and the
/// queue of intentions. The front intention is the one scheduled next.
#[derive(Clone, Debug, Default)]
pub struct Agent {
    pub name: String,
    /// Belief base in insertion order; duplicates are allowed and lookup
    /// is a linear scan.
    pub beliefs: Vec<BeliefAtom>,
    pub rules: Vec<Rule>,
    pub plans: Vec<Plan>,
    pub intents: VecDeque<Intention>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Agent {
            name: name.into(),
            ..Agent::default()
        }
    }

    /// Builds an agent from a parsed program.
    ///
    /// Every initial belief raises a belief-addition event, and every
    /// initial goal seeds its own intention stack, so `+b` and `+!g`
    /// plans fire for the initial program state.
    pub fn from_program(name: impl Into<String>, program: AgentProgram) -> Self {
        let mut agent = Agent::new(name);
        agent.rules = program.rules;
        agent.plans = program.plans;

        for belief in program.beliefs {
            agent.add_belief(belief);
        }

        for goal in program.goals {
            agent
                .intents
                .push_back(VecDeque::from([IntentionFrame::achievement(goal)]));
        }

        agent
    }

    /// Adds a belief delivered from outside (another agent or the driver)
    /// and queues the matching event at the back of the intention queue.
    ///
    /// Belief additions from inside a plan body instead push their event
    /// to the front; that path lives in the interpreter.
    pub fn add_belief(&mut self, belief: BeliefAtom) {
        self.beliefs.push(belief.clone());
        self.intents
            .push_back(VecDeque::from([IntentionFrame::belief_event(belief)]));
    }

    /// Removes every belief the pattern unifies with.
    pub fn remove_beliefs(&mut self, pattern: &Term) {
        self.beliefs
            .retain(|belief| !unifies_with(pattern, &Term::Atom(belief.clone())));
    }

    /// Whether any intention remains.
    pub fn has_work(&self) -> bool {
        !self.intents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Variable;

    #[test]
    fn test_from_program_seeds_goal_intentions() {
        let program = AgentProgram {
            beliefs: vec![BeliefAtom::nullary("b")],
            goals: vec![BeliefAtom::nullary("g")],
            ..AgentProgram::default()
        };

        let agent = Agent::from_program("uno", program);
        assert_eq!(agent.beliefs.len(), 1);
        // One event for the initial belief, one intention for the goal.
        assert_eq!(agent.intents.len(), 2);
        assert_eq!(agent.intents[0][0].goal_kind, GoalKind::Belief);

        let frame = agent.intents[1].front().unwrap();
        assert!(frame.is_external());
        assert_eq!(frame.goal_kind, GoalKind::Achieve);
        assert_eq!(frame.trigger.functor, "g");
    }

    #[test]
    fn test_add_belief_queues_event() {
        let mut agent = Agent::new("uno");
        agent.add_belief(BeliefAtom::nullary("seen"));

        assert_eq!(agent.beliefs.len(), 1);
        assert_eq!(agent.intents.len(), 1);
        assert_eq!(agent.intents[0][0].goal_kind, GoalKind::Belief);
    }

    #[test]
    fn test_remove_beliefs_by_pattern() {
        let mut agent = Agent::new("uno");
        agent.beliefs = vec![
            BeliefAtom::new("f", vec![Term::Num(1.0)]),
            BeliefAtom::new("f", vec![Term::Num(2.0)]),
            BeliefAtom::new("g", vec![Term::Num(1.0)]),
        ];

        let pattern = Term::Atom(BeliefAtom::new("f", vec![Term::Var(Variable::new("X"))]));
        agent.remove_beliefs(&pattern);

        assert_eq!(agent.beliefs.len(), 1);
        assert_eq!(agent.beliefs[0].functor, "g");
    }
}
