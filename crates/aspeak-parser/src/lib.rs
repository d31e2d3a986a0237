//! aspeak-parser — concrete syntax for aspeak agent programs.
//!
//! A hand-rolled lexer and recursive-descent parser that turn agent source
//! text into [`aspeak_core::AgentProgram`] values, applying the smart
//! constructors while parsing so expressions are partially evaluated and
//! validated at load time.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{Location, ParseError};
pub use parser::{parse_program, parse_term};
