//! Construction-time grammar errors.

use thiserror::Error;

/// A malformed grammar.
///
/// These are programming errors in the grammar declaration, surfaced to the
/// grammar author as soon as they are detected. None of them is recoverable
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("rule `{name}` is declared more than once in grammar `{grammar}`")]
    DuplicateRule { grammar: String, name: String },

    #[error("terminal `{name}` is registered more than once")]
    DuplicateTerminal { name: String },

    #[error("a grammar may declare at most {max} terminal kinds")]
    TooManyTerminals { max: usize },

    #[error("occurrence indices start at 1, but `{target}` in rule `{enclosing}` uses 0")]
    ZeroOccurrence { enclosing: String, target: String },

    #[error("occurrence {occurrence} of `{target}` is claimed twice inside rule `{enclosing}`")]
    DuplicateOccurrence {
        enclosing: String,
        target: String,
        occurrence: u32,
    },

    /// Analysis was requested while some referenced rule is still undeclared.
    #[error("grammar `{grammar}` analyzed before these rules were declared: {}", .missing.join(", "))]
    PrematureAnalysis { grammar: String, missing: Vec<String> },

    /// A rule looked up by name at runtime that the grammar never declared.
    #[error("grammar `{grammar}` has no rule named `{name}`")]
    UnknownRule { grammar: String, name: String },

    #[error("follow key `{key}` recorded twice")]
    DuplicateFollowKey { key: String },

    /// A resync lookup for a reference the analysis never saw.
    #[error("no follow set recorded for `{key}`")]
    MissingFollowKey { key: String },
}
