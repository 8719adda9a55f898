//! The frozen grammar arena.

mod builder;

pub use builder::{Expr, GrammarBuilder, RuleOptions};

use crate::{NodeId, Production, RuleId, TerminalKind, TerminalRegistry};
use rustc_hash::FxHashMap;

/// A declared rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDef {
    pub name: String,
    pub body: NodeId,
    /// Whether a failure inside this rule may resync on its follow set.
    pub resync_enabled: bool,
}

/// An immutable grammar: terminals, rules and the production arena.
///
/// Built by [`GrammarBuilder::build`], which guarantees that every rule
/// referenced anywhere in the grammar is declared.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: String,
    terminals: TerminalRegistry,
    nodes: Vec<Production>,
    rules: Vec<RuleDef>,
    rule_names: FxHashMap<String, RuleId>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    #[inline]
    pub fn terminal_name(&self, kind: TerminalKind) -> &str {
        self.terminals.name(kind)
    }

    /// Get a production node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this grammar.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Production {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a rule definition.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this grammar.
    #[inline]
    pub fn rule(&self, id: RuleId) -> &RuleDef {
        &self.rules[id.index()]
    }

    #[inline]
    pub fn rule_name(&self, id: RuleId) -> &str {
        &self.rule(id).name
    }

    pub fn rule_by_name(&self, name: &str) -> Option<RuleId> {
        self.rule_names.get(name).copied()
    }

    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// All rules with their ids, in id order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &RuleDef)> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(i, def)| u32::try_from(i).ok().map(|i| (RuleId::new(i), def)))
    }

    /// Rule references inside `rule`'s body, as `(target, occurrence)` in
    /// declaration order.
    pub fn references_in(&self, rule: RuleId) -> Vec<(RuleId, u32)> {
        let mut out = Vec::new();
        self.visit_body(rule, |prod| {
            if let Production::NonTerminal { rule, occurrence } = prod {
                out.push((*rule, *occurrence));
            }
        });
        out
    }

    /// Terminal consumptions inside `rule`'s body, as `(kind, occurrence)`
    /// in declaration order.
    pub fn terminals_in(&self, rule: RuleId) -> Vec<(TerminalKind, u32)> {
        let mut out = Vec::new();
        self.visit_body(rule, |prod| {
            if let Production::Terminal { kind, occurrence } = prod {
                out.push((*kind, *occurrence));
            }
        });
        out
    }

    /// Pre-order walk over one rule body. Does not follow rule references.
    fn visit_body(&self, rule: RuleId, mut f: impl FnMut(&Production)) {
        let mut stack = vec![self.rule(rule).body];
        while let Some(id) = stack.pop() {
            let prod = self.node(id);
            f(prod);
            // Reverse so the leftmost child is visited first.
            stack.extend(prod.children().into_iter().rev());
        }
    }
}

#[cfg(test)]
mod tests;
