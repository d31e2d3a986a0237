//! The multi-agent driver: round-robin sweeps and message delivery.

use aspeak_core::{Agent, Term};

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;

/// Steps every agent once and reports whether any of them has work left.
pub fn run_once(
    interpreter: &mut Interpreter,
    env: &Environment,
    agents: &mut [Agent],
) -> Result<bool, RuntimeError> {
    let mut more_work = false;
    for agent in agents.iter_mut() {
        more_work = interpreter.step(env, agent)? || more_work;
    }
    Ok(more_work)
}

/// A set of agents driven to quiescence over one shared environment.
pub struct System {
    interpreter: Interpreter,
    env: Environment,
    agents: Vec<Agent>,
}

impl System {
    pub fn new(env: Environment) -> Self {
        System {
            interpreter: Interpreter::new(),
            env,
            agents: Vec::new(),
        }
    }

    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    /// Runs sweeps until a full pass leaves no work and no messages in
    /// flight.
    ///
    /// Queued beliefs are delivered strictly between sweeps; a delivered
    /// belief queues its event at the back of the recipient's intention
    /// queue.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            let more_work = run_once(&mut self.interpreter, &self.env, &mut self.agents)?;
            let delivered = self.deliver_messages()?;
            if !more_work && !delivered {
                return Ok(());
            }
        }
    }

    fn deliver_messages(&mut self) -> Result<bool, RuntimeError> {
        let mut delivered = false;

        for message in self.env.take_outbox() {
            let Some(agent) = self
                .agents
                .iter_mut()
                .find(|agent| agent.name == message.recipient)
            else {
                return Err(RuntimeError::UnknownRecipient {
                    recipient: message.recipient,
                });
            };

            let atom = match message.term {
                Term::Atom(atom) => atom,
                other => {
                    return Err(RuntimeError::NonAtomBelief {
                        term: other.to_string(),
                    });
                }
            };

            tracing::debug!(agent = %agent.name, belief = %atom, "delivering belief");
            agent.add_belief(atom);
            delivered = true;
        }

        Ok(delivered)
    }
}
