//! Walking rule bodies with the "rest" of the production in hand.
//!
//! At every terminal and rule reference the walker knows two things:
//!
//! - `curr_rest`: the siblings after the current node at the current
//!   nesting level;
//! - `prev_rest`: the rest of every enclosing level, innermost first.
//!
//! `curr_rest ++ prev_rest` is everything the enclosing rule may still match
//! after the current node, which is what both follow engines need.

use crate::stack::ensure_sufficient_stack;
use gram_ir::{Grammar, NodeId, Production, RepetitionKind, RuleId, TerminalKind};
use smallvec::SmallVec;

/// One element of a rest sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RestEntry {
    /// A production that runs next.
    Node(NodeId),
    /// An optional further iteration of a repetition. Starts with the
    /// separator when there is one, otherwise with the body.
    Again {
        body: NodeId,
        separator: Option<NodeId>,
    },
}

/// A rest sequence, read left to right like a flat production.
pub type Rest = SmallVec<[RestEntry; 8]>;

fn concat(curr_rest: &[RestEntry], prev_rest: &[RestEntry]) -> Rest {
    let mut full = Rest::with_capacity(curr_rest.len() + prev_rest.len());
    full.extend_from_slice(curr_rest);
    full.extend_from_slice(prev_rest);
    full
}

/// A visitor over one rule body that receives the rest at each leaf.
pub trait RestWalker<'g> {
    fn grammar(&self) -> &'g Grammar;

    fn walk_terminal(
        &mut self,
        _kind: TerminalKind,
        _occurrence: u32,
        _curr_rest: &[RestEntry],
        _prev_rest: &[RestEntry],
    ) {
    }

    fn walk_rule_ref(
        &mut self,
        _rule: RuleId,
        _occurrence: u32,
        _curr_rest: &[RestEntry],
        _prev_rest: &[RestEntry],
    ) {
    }

    /// Walk the body of `rule`. Nothing follows a rule body from the rule's
    /// own point of view, so both rests start empty.
    fn walk_rule(&mut self, rule: RuleId) {
        let body = self.grammar().rule(rule).body;
        self.walk_node(body, &[], &[]);
    }

    fn walk_node(&mut self, node: NodeId, curr_rest: &[RestEntry], prev_rest: &[RestEntry]) {
        let grammar = self.grammar();
        ensure_sufficient_stack(|| match grammar.node(node) {
            Production::Terminal { kind, occurrence } => {
                self.walk_terminal(*kind, *occurrence, curr_rest, prev_rest);
            }
            Production::NonTerminal { rule, occurrence } => {
                self.walk_rule_ref(*rule, *occurrence, curr_rest, prev_rest);
            }
            Production::Sequence(items) | Production::Flat(items) => {
                let full = concat(curr_rest, prev_rest);
                self.walk_items(items, &full);
            }
            Production::Alternation(branches) => {
                let full = concat(curr_rest, prev_rest);
                for &branch in branches {
                    self.walk_node(branch, &[], &full);
                }
            }
            Production::Repetition {
                kind,
                body,
                separator,
            } => self.walk_repetition(*kind, *body, *separator, curr_rest, prev_rest),
        });
    }

    /// Walk siblings; each sees the siblings after it as its `curr_rest`.
    fn walk_items(&mut self, items: &[NodeId], prev_rest: &[RestEntry]) {
        for (i, &item) in items.iter().enumerate() {
            let curr: Rest = items[i + 1..].iter().copied().map(RestEntry::Node).collect();
            self.walk_node(item, &curr, prev_rest);
        }
    }

    /// After one iteration of a repeating body, either another iteration
    /// starts or the loop exits into `curr_rest`.
    fn walk_repetition(
        &mut self,
        kind: RepetitionKind,
        body: NodeId,
        separator: Option<NodeId>,
        curr_rest: &[RestEntry],
        prev_rest: &[RestEntry],
    ) {
        if !kind.repeats() {
            let full = concat(curr_rest, prev_rest);
            self.walk_node(body, &[], &full);
            return;
        }

        let mut full = Rest::new();
        full.push(RestEntry::Again { body, separator });
        full.extend_from_slice(curr_rest);
        full.extend_from_slice(prev_rest);
        self.walk_node(body, &[], &full);

        if let Some(sep) = separator {
            // A separator is always followed by another body.
            let mut after_sep = Rest::new();
            after_sep.push(RestEntry::Node(body));
            after_sep.extend_from_slice(&full);
            self.walk_node(sep, &[], &after_sep);
        }
    }
}
