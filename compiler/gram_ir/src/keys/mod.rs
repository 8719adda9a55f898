//! Keys for the follow tables.
//!
//! The tables are keyed by structured values; the string forms below are a
//! diagnostic projection only. They match the historical string keys:
//!
//! - between rules: `<ruleName><occurrence>_~IN~_<enclosingRuleName>`
//! - inside a rule: `<terminalName><occurrence>_~IN~_` followed by the
//!   enclosing rule name.

use crate::{Grammar, RuleId, TerminalKind};
use std::fmt;

/// Separator between the occurrence part of a key and the enclosing rule.
pub const IN: &str = "_~IN~_";

/// Prefix of a between-rules follow key.
pub fn between_rules_follow_prefix(rule_name: &str, occurrence: u32) -> String {
    format!("{rule_name}{occurrence}{IN}")
}

/// Prefix of an in-rule terminal follow key.
pub fn in_rule_follow_prefix(terminal_name: &str, occurrence: u32) -> String {
    format!("{terminal_name}{occurrence}{IN}")
}

/// Identity of one rule-reference occurrence: `rule` referenced for the
/// `occurrence`-th time inside `enclosing`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FollowKey {
    pub rule: RuleId,
    pub occurrence: u32,
    pub enclosing: RuleId,
}

impl FollowKey {
    #[inline]
    pub const fn new(rule: RuleId, occurrence: u32, enclosing: RuleId) -> Self {
        FollowKey {
            rule,
            occurrence,
            enclosing,
        }
    }

    /// String projection of this key for diagnostics.
    pub fn display<'g>(&self, grammar: &'g Grammar) -> FollowKeyDisplay<'g> {
        FollowKeyDisplay { key: *self, grammar }
    }
}

pub struct FollowKeyDisplay<'g> {
    key: FollowKey,
    grammar: &'g Grammar,
}

impl fmt::Display for FollowKeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{IN}{}",
            self.grammar.rule_name(self.key.rule),
            self.key.occurrence,
            self.grammar.rule_name(self.key.enclosing)
        )
    }
}

/// Identity of one terminal consumption inside a rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalKey {
    pub terminal: TerminalKind,
    pub occurrence: u32,
    pub enclosing: RuleId,
}

impl TerminalKey {
    #[inline]
    pub const fn new(terminal: TerminalKind, occurrence: u32, enclosing: RuleId) -> Self {
        TerminalKey {
            terminal,
            occurrence,
            enclosing,
        }
    }

    pub fn display<'g>(&self, grammar: &'g Grammar) -> TerminalKeyDisplay<'g> {
        TerminalKeyDisplay { key: *self, grammar }
    }
}

pub struct TerminalKeyDisplay<'g> {
    key: TerminalKey,
    grammar: &'g Grammar,
}

impl fmt::Display for TerminalKeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{IN}{}",
            self.grammar.terminal_name(self.key.terminal),
            self.key.occurrence,
            self.grammar.rule_name(self.key.enclosing)
        )
    }
}
