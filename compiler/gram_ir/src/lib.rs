//! Grammar model for the gram parsing toolkit.
//!
//! A grammar is declared once as a tree of productions and then frozen into
//! an arena-backed [`Grammar`]. Everything downstream (FIRST sets, resync
//! follow tables, the invocation runtime) reads the frozen value and never
//! mutates it.
//!
//! # Layout
//!
//! - [`TerminalKind`] / [`TerminalRegistry`]: token categories and their names.
//! - [`TerminalSet`]: `u128` bitset of terminal kinds.
//! - [`Production`]: one node of a rule body, addressed by [`NodeId`].
//! - [`GrammarBuilder`] / [`Expr`]: the construction phase.
//! - [`FollowKey`] / [`TerminalKey`]: structured keys for the analysis tables.

mod error;
mod grammar;
mod ids;
mod keys;
mod production;
mod terminal;
mod terminal_set;

pub use error::StructuralError;
pub use grammar::{Expr, Grammar, GrammarBuilder, RuleDef, RuleOptions};
pub use ids::{NodeId, RuleId};
pub use keys::{
    between_rules_follow_prefix, in_rule_follow_prefix, FollowKey, FollowKeyDisplay, TerminalKey,
    TerminalKeyDisplay, IN,
};
pub use production::{Children, Production, RepetitionKind};
pub use terminal::{TerminalKind, TerminalRegistry};
pub use terminal_set::{TerminalSet, TerminalSetIter};
