//! Parse errors with source positions.

use aspeak_core::TermError;
use thiserror::Error;

/// A position in the source text, 1-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors produced while lexing or parsing an agent program.
///
/// Smart-constructor domain errors surface here as well: operator
/// applications are evaluated at parse time, so a malformed expression
/// like `"a" + 1` is rejected while loading the program.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{location}: unexpected character '{found}'")]
    UnexpectedCharacter { found: char, location: Location },

    #[error("{location}: unterminated string literal")]
    UnterminatedString { location: Location },

    #[error("{location}: invalid escape sequence '\\{escape}'")]
    InvalidEscape { escape: char, location: Location },

    #[error("{location}: invalid variable name '{name}'")]
    InvalidVariable { name: String, location: Location },

    #[error("{location}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("{location}: {source}")]
    Term {
        source: TermError,
        location: Location,
    },

    #[error("{location}: belief '{atom}' is not unifiable and cannot be loaded")]
    InvalidBelief { atom: String, location: Location },

    #[error("{location}: rule head '{atom}' must be unifiable")]
    InvalidRuleHead { atom: String, location: Location },

    #[error("{location}: '{term}' is not a valid context")]
    InvalidContext { term: String, location: Location },
}
