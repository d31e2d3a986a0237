//! aspeak-runtime — the execution core of the aspeak interpreter.
//!
//! Builds on the term algebra of `aspeak-core` with the backtracking
//! logical-consequence generators, the built-in action registry, the step
//! interpreter, and the round-robin multi-agent driver.

pub mod consequence;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod message;
pub mod registry;
pub mod system;

pub use consequence::{consequence, GoalGen};
pub use environment::Environment;
pub use error::RuntimeError;
pub use interpreter::Interpreter;
pub use message::Message;
pub use registry::{Action, ActionContext, ActionGenerator, ActionRegistry};
pub use system::{run_once, System};
