//! Core error types.

use thiserror::Error;

use crate::term::{BinaryOp, Term, UnaryOp};

/// Domain errors raised by the smart constructors.
///
/// These indicate a malformed program (e.g. adding a string to a list) and
/// are fatal at load time. Unification failure is never an error; it is a
/// `false` return.
#[derive(Debug, Error)]
pub enum TermError {
    #[error("invalid operand type for {op}: {operand}")]
    UnaryOperand { op: UnaryOp, operand: Term },

    #[error("invalid operand types for {op}: {left}, {right}")]
    BinaryOperands {
        op: BinaryOp,
        left: Term,
        right: Term,
    },
}

impl TermError {
    pub(crate) fn unary(op: UnaryOp, operand: Term) -> Self {
        TermError::UnaryOperand { op, operand }
    }

    pub(crate) fn binary(op: BinaryOp, left: Term, right: Term) -> Self {
        TermError::BinaryOperands { op, left, right }
    }
}
