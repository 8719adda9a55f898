//! Parse errors.
//!
//! Recognition errors ([`ParseError::MismatchedToken`],
//! [`ParseError::NoViableAlternative`]) are what recovery and speculation
//! deal with. [`ParseError::Structural`] means the grammar and the rule
//! functions disagree; it is never recovered from and never turned into a
//! speculation rejection.

use gram_ir::{StructuralError, TerminalKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected `{expected_name}`, found {found_name} at token {position}")]
    MismatchedToken {
        expected: TerminalKind,
        expected_name: String,
        /// `None` at the end of input.
        found: Option<TerminalKind>,
        found_name: String,
        position: usize,
    },

    /// No gated alternative accepted the input.
    #[error("no viable alternative in rule `{rule}` at token {position}; expected {expected}")]
    NoViableAlternative {
        rule: String,
        position: usize,
        expected: String,
    },

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl ParseError {
    /// Whether this error is about the input rather than the grammar.
    pub fn is_recognition(&self) -> bool {
        !matches!(self, ParseError::Structural(_))
    }

    /// Token position the error was raised at, if it is a recognition error.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::MismatchedToken { position, .. }
            | ParseError::NoViableAlternative { position, .. } => Some(*position),
            ParseError::Structural(_) => None,
        }
    }
}
