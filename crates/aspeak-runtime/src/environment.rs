//! The environment: the action standard library, the output sink, and the
//! outgoing message queue.
//!
//! The environment is shared by all agents of a run. It is only touched
//! from inside `step`, which is single-threaded and cooperative, so plain
//! interior mutability is enough for the sink and the outbox.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};

use aspeak_core::{unify, Agent, BeliefAtom, Term, Unifier};

use crate::error::RuntimeError;
use crate::message::Message;
use crate::registry::{Action, ActionContext, ActionGenerator, ActionRegistry};

/// The default environment with the standard library of actions.
pub struct Environment {
    actions: ActionRegistry,
    sink: RefCell<Box<dyn Write>>,
    outbox: RefCell<VecDeque<Message>>,
}

impl Environment {
    /// An environment printing to stdout.
    pub fn new() -> Self {
        Environment::with_sink(Box::new(io::stdout()))
    }

    /// An environment printing to the given sink; tests use this to
    /// capture `.print` output.
    pub fn with_sink(sink: Box<dyn Write>) -> Self {
        let mut actions = ActionRegistry::new();
        let standard: Vec<Box<dyn Action>> = vec![
            Box::new(PrintAction),
            Box::new(MyNameAction),
            Box::new(FailAction),
            Box::new(SendBeliefAction),
        ];
        for action in standard {
            // The standard names are distinct literals; registration into
            // the fresh registry cannot collide.
            let _ = actions.register(action);
        }

        Environment {
            actions,
            sink: RefCell::new(sink),
            outbox: RefCell::new(VecDeque::new()),
        }
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Extends the standard library with a scenario-specific action.
    pub fn register_action(&mut self, action: Box<dyn Action>) -> Result<(), RuntimeError> {
        self.actions.register(action)
    }

    /// Looks up an action for the atom and spawns a generator for this
    /// invocation. `None` means "not an action": the goal falls through
    /// to belief matching.
    pub fn get_action<'a>(
        &'a self,
        agent: &'a Agent,
        atom: &BeliefAtom,
        unifier: &Unifier,
    ) -> Option<Box<dyn ActionGenerator + 'a>> {
        self.actions.get(&atom.functor).map(|action| {
            action.spawn(ActionContext {
                env: self,
                agent,
                atom: atom.clone(),
                unifier: unifier.clone(),
            })
        })
    }

    /// Writes one line to the environment's sink.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut sink = self.sink.borrow_mut();
        writeln!(sink, "{line}")?;
        sink.flush()
    }

    /// Queues an outgoing message for delivery between sweeps.
    pub fn post(&self, message: Message) {
        self.outbox.borrow_mut().push_back(message);
    }

    /// Takes every queued message, leaving the outbox empty.
    pub fn take_outbox(&self) -> Vec<Message> {
        self.outbox.borrow_mut().drain(..).collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

// ---------------------------------------------------------------------
// Standard library
// ---------------------------------------------------------------------

/// `.print(t0, …, tn)`: renders each argument under the current unifier
/// (strings unquoted, everything else in source form), ends the line, and
/// succeeds once.
struct PrintAction;

struct PrintGen<'a> {
    ctx: ActionContext<'a>,
    done: bool,
}

impl Action for PrintAction {
    fn name(&self) -> &str {
        ".print"
    }

    fn spawn<'a>(&'a self, ctx: ActionContext<'a>) -> Box<dyn ActionGenerator + 'a> {
        Box::new(PrintGen { ctx, done: false })
    }
}

impl ActionGenerator for PrintGen<'_> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        if self.done {
            return Ok(false);
        }
        self.done = true;

        let mut line = String::new();
        for term in &self.ctx.atom.terms {
            match self.ctx.unifier.apply(term)? {
                Term::Str(text) => line.push_str(&text),
                other => line.push_str(&other.to_string()),
            }
        }

        self.ctx.env.write_line(&line)?;
        Ok(true)
    }

    fn current(&self) -> Unifier {
        self.ctx.unifier.clone()
    }
}

/// `.my_name(t)`: unifies `t` with the agent's name.
struct MyNameAction;

struct MyNameGen<'a> {
    ctx: ActionContext<'a>,
    unifier: Unifier,
    done: bool,
}

impl Action for MyNameAction {
    fn name(&self) -> &str {
        ".my_name"
    }

    fn spawn<'a>(&'a self, ctx: ActionContext<'a>) -> Box<dyn ActionGenerator + 'a> {
        let unifier = ctx.unifier.clone();
        Box::new(MyNameGen {
            ctx,
            unifier,
            done: false,
        })
    }
}

impl ActionGenerator for MyNameGen<'_> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        if self.done {
            return Ok(false);
        }
        self.done = true;

        if self.ctx.atom.arity() != 1 {
            return Err(RuntimeError::action(
                ".my_name",
                "expects exactly one argument",
            ));
        }

        let arg = self.unifier.apply(&self.ctx.atom.terms[0])?;
        let name = Term::Str(self.ctx.agent.name.clone());
        Ok(unify(&name, &arg, &mut self.unifier))
    }

    fn current(&self) -> Unifier {
        self.unifier.clone()
    }
}

/// `.fail`: never yields a unifier.
struct FailAction;

struct FailGen {
    unifier: Unifier,
}

impl Action for FailAction {
    fn name(&self) -> &str {
        ".fail"
    }

    fn spawn<'a>(&'a self, ctx: ActionContext<'a>) -> Box<dyn ActionGenerator + 'a> {
        Box::new(FailGen {
            unifier: ctx.unifier,
        })
    }
}

impl ActionGenerator for FailGen {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        Ok(false)
    }

    fn current(&self) -> Unifier {
        self.unifier.clone()
    }
}

/// `.send_belief(recipient, belief)`: queues a ground belief atom for
/// delivery to the named agent between sweeps, then succeeds once.
struct SendBeliefAction;

struct SendBeliefGen<'a> {
    ctx: ActionContext<'a>,
    done: bool,
}

impl Action for SendBeliefAction {
    fn name(&self) -> &str {
        ".send_belief"
    }

    fn spawn<'a>(&'a self, ctx: ActionContext<'a>) -> Box<dyn ActionGenerator + 'a> {
        Box::new(SendBeliefGen { ctx, done: false })
    }
}

impl ActionGenerator for SendBeliefGen<'_> {
    fn next(&mut self) -> Result<bool, RuntimeError> {
        if self.done {
            return Ok(false);
        }
        self.done = true;

        if self.ctx.atom.arity() != 2 {
            return Err(RuntimeError::action(
                ".send_belief",
                "expects a recipient and a belief",
            ));
        }

        let recipient = match self.ctx.unifier.apply(&self.ctx.atom.terms[0])? {
            Term::Str(name) => name,
            other => {
                return Err(RuntimeError::action(
                    ".send_belief",
                    format!("recipient must be a string, got '{other}'"),
                ));
            }
        };

        let term = self.ctx.unifier.apply(&self.ctx.atom.terms[1])?;
        if !matches!(&term, Term::Atom(atom) if atom.is_ground()) {
            return Err(RuntimeError::action(
                ".send_belief",
                format!("'{term}' is not a ground belief atom"),
            ));
        }

        tracing::debug!(
            from = %self.ctx.agent.name,
            to = %recipient,
            belief = %term,
            "sending belief"
        );
        self.ctx.env.post(Message { recipient, term });
        Ok(true)
    }

    fn current(&self) -> Unifier {
        self.ctx.unifier.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspeak_core::Variable;
    use std::sync::{Arc, Mutex};

    /// A sink tests can read back after the environment wrote to it.
    #[derive(Clone, Default)]
    pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl SharedSink {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("sink lock")).into_owned()
        }
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("sink lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn spawn<'a>(
        env: &'a Environment,
        agent: &'a Agent,
        atom: BeliefAtom,
        unifier: &Unifier,
    ) -> Box<dyn ActionGenerator + 'a> {
        env.get_action(agent, &atom, unifier).expect("known action")
    }

    #[test]
    fn test_print_renders_strings_unquoted() {
        let sink = SharedSink::default();
        let env = Environment::with_sink(Box::new(sink.clone()));
        let agent = Agent::new("uno");

        let atom = BeliefAtom::new(
            ".print",
            vec![Term::from("x is "), Term::Var(Variable::new("X"))],
        );
        let mut unifier = Unifier::new();
        unifier.insert("X", Term::Num(7.0));

        let mut generator = spawn(&env, &agent, atom, &unifier);
        assert!(generator.next().unwrap());
        assert!(!generator.next().unwrap());
        assert_eq!(sink.contents(), "x is 7\n");
    }

    #[test]
    fn test_my_name_unifies() {
        let env = Environment::with_sink(Box::new(io::sink()));
        let agent = Agent::new("uno");

        let atom = BeliefAtom::new(".my_name", vec![Term::Var(Variable::new("N"))]);
        let mut generator = spawn(&env, &agent, atom, &Unifier::new());
        assert!(generator.next().unwrap());
        assert_eq!(generator.current().get("N"), Some(&Term::from("uno")));
        assert!(!generator.next().unwrap());
    }

    #[test]
    fn test_my_name_arity_error() {
        let env = Environment::with_sink(Box::new(io::sink()));
        let agent = Agent::new("uno");

        let atom = BeliefAtom::nullary(".my_name");
        let mut generator = spawn(&env, &agent, atom, &Unifier::new());
        assert!(generator.next().is_err());
    }

    #[test]
    fn test_fail_never_yields() {
        let env = Environment::with_sink(Box::new(io::sink()));
        let agent = Agent::new("uno");

        let atom = BeliefAtom::nullary(".fail");
        let mut generator = spawn(&env, &agent, atom, &Unifier::new());
        assert!(!generator.next().unwrap());
    }

    #[test]
    fn test_send_belief_posts_message() {
        let env = Environment::with_sink(Box::new(io::sink()));
        let agent = Agent::new("uno");

        let atom = BeliefAtom::new(
            ".send_belief",
            vec![
                Term::from("dos"),
                Term::Atom(BeliefAtom::new("ping", vec![Term::Num(1.0)])),
            ],
        );
        let mut generator = spawn(&env, &agent, atom, &Unifier::new());
        assert!(generator.next().unwrap());
        drop(generator);

        let outbox = env.take_outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].recipient, "dos");
        assert!(env.take_outbox().is_empty());
    }

    #[test]
    fn test_send_belief_rejects_non_ground() {
        let env = Environment::with_sink(Box::new(io::sink()));
        let agent = Agent::new("uno");

        let atom = BeliefAtom::new(
            ".send_belief",
            vec![
                Term::from("dos"),
                Term::Atom(BeliefAtom::new("ping", vec![Term::Var(Variable::new("X"))])),
            ],
        );
        let mut generator = spawn(&env, &agent, atom, &Unifier::new());
        assert!(generator.next().is_err());
    }

    #[test]
    fn test_unknown_functor_is_not_an_action() {
        let env = Environment::with_sink(Box::new(io::sink()));
        let agent = Agent::new("uno");
        assert!(env
            .get_action(&agent, &BeliefAtom::nullary("plain"), &Unifier::new())
            .is_none());
    }
}
