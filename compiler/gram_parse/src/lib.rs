//! Invocation runtime for analyzed grammars.
//!
//! Rule functions are plain Rust functions over a [`Parser`]. Each one is
//! bound to its declared rule by a [`RuleHandle`], and calls
//! [`Parser::consume`] for terminals and [`Parser::subrule`] for rule
//! references, in the same order as the rule's declaration.
//!
//! On top of that the parser offers resync recovery driven by the analyzed
//! follow sets, and speculative invocation with snapshot/restore for
//! alternatives that share an unbounded prefix.

mod backtrack;
mod config;
mod cursor;
mod error;
mod parser;
pub mod recovery;
mod rule;
mod snapshot;
mod token;

pub use backtrack::{GatedAlternative, Rejection, Speculation};
pub use config::ParserConfig;
pub use cursor::Cursor;
pub use error::ParseError;
pub use parser::Parser;
pub use recovery::synchronize;
pub use rule::{RuleBody, RuleHandle};
pub use snapshot::ParserSnapshot;
pub use token::Token;
