//! FIRST sets.
//!
//! `first(node)` is the set of terminal kinds that can be the first token
//! matched when entering `node`. Nullability (whether `node` can match the
//! empty input) is computed alongside but never shows up in the set itself;
//! it only decides how far a sequence has to be scanned.
//!
//! # Recursive grammars
//!
//! Rule references are resolved through the rule arena with an in-progress
//! marker per rule. Re-entering a rule whose FIRST set is still being
//! computed contributes the empty set and counts as not nullable. For
//! grammars without left recursion this never happens, because a rule is
//! only re-entered through its left edge. For left-recursive rules it is an
//! approximation: the re-entered rule adds nothing on the recursive path.
//! Such rules are recorded and exposed via
//! [`FirstSets::approximated_rules`].
//!
//! Results that depended on an in-progress rule are not memoized until that
//! rule's computation finishes, so the memo never depends on visit order.

use crate::rest::RestEntry;
use crate::stack::ensure_sufficient_stack;
use gram_ir::{Grammar, NodeId, Production, RuleId, TerminalSet};
use rustc_hash::FxHashMap;
use tracing::trace;

/// FIRST set and nullability of one production.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FirstInfo {
    pub first: TerminalSet,
    pub nullable: bool,
}

impl FirstInfo {
    const EMPTY_MATCH: FirstInfo = FirstInfo {
        first: TerminalSet::new(),
        nullable: true,
    };
}

/// Depth of the shallowest in-progress rule a result depended on.
type Taint = Option<usize>;

/// Memoizing FIRST-set engine over one grammar.
pub struct FirstSets<'g> {
    grammar: &'g Grammar,
    memo: FxHashMap<NodeId, FirstInfo>,
    /// In-progress marker per rule: the depth at which it was entered.
    in_progress: Vec<Option<usize>>,
    depth: usize,
    approximated: Vec<RuleId>,
}

impl<'g> FirstSets<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        FirstSets {
            grammar,
            memo: FxHashMap::default(),
            in_progress: vec![None; grammar.rule_count()],
            depth: 0,
            approximated: Vec::new(),
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// FIRST set of a node.
    pub fn first(&mut self, node: NodeId) -> TerminalSet {
        self.info(node).first
    }

    /// FIRST set and nullability of a node.
    pub fn info(&mut self, node: NodeId) -> FirstInfo {
        self.compute(node).0
    }

    /// FIRST set and nullability of a rule's body.
    pub fn rule_info(&mut self, rule: RuleId) -> FirstInfo {
        self.compute_rule(rule).0
    }

    /// FIRST of a rest sequence, treated as one flat production.
    pub fn first_of_rest(&mut self, rest: &[RestEntry]) -> FirstInfo {
        let mut acc = TerminalSet::new();
        for entry in rest {
            let (info, optional) = match *entry {
                RestEntry::Node(node) => (self.info(node), false),
                RestEntry::Again { body, separator } => (self.info(separator.unwrap_or(body)), true),
            };
            acc.union_with(&info.first);
            if !(info.nullable || optional) {
                return FirstInfo {
                    first: acc,
                    nullable: false,
                };
            }
        }
        FirstInfo {
            first: acc,
            nullable: true,
        }
    }

    /// Rules whose FIRST computation re-entered themselves.
    pub fn approximated_rules(&self) -> &[RuleId] {
        &self.approximated
    }

    /// Compute every rule's FIRST set and freeze the results.
    pub fn finish(mut self) -> FirstSetCache {
        let grammar = self.grammar;
        let rules = grammar.rules().map(|(id, _)| self.rule_info(id)).collect();
        let mut approximated = self.approximated;
        approximated.sort();
        FirstSetCache {
            nodes: self.memo,
            rules,
            approximated,
        }
    }

    fn compute(&mut self, node: NodeId) -> (FirstInfo, Taint) {
        if let Some(info) = self.memo.get(&node) {
            return (*info, None);
        }
        let (info, taint) = ensure_sufficient_stack(|| self.compute_uncached(node));
        if taint.is_none() {
            self.memo.insert(node, info);
        }
        (info, taint)
    }

    fn compute_uncached(&mut self, node: NodeId) -> (FirstInfo, Taint) {
        let grammar = self.grammar;
        match grammar.node(node) {
            Production::Terminal { kind, .. } => (
                FirstInfo {
                    first: TerminalSet::single(*kind),
                    nullable: false,
                },
                None,
            ),
            Production::NonTerminal { rule, .. } => self.compute_rule(*rule),
            Production::Sequence(items) | Production::Flat(items) => self.compute_sequence(items),
            Production::Alternation(branches) => {
                let mut acc = FirstInfo::default();
                let mut taint = None;
                for &branch in branches {
                    let (info, t) = self.compute(branch);
                    acc.first.union_with(&info.first);
                    acc.nullable |= info.nullable;
                    taint = min_taint(taint, t);
                }
                (acc, taint)
            }
            Production::Repetition { kind, body, .. } => {
                let (inner, taint) = self.compute(*body);
                (
                    FirstInfo {
                        first: inner.first,
                        nullable: kind.allows_empty() || inner.nullable,
                    },
                    taint,
                )
            }
        }
    }

    fn compute_sequence(&mut self, items: &[NodeId]) -> (FirstInfo, Taint) {
        let mut acc = FirstInfo::EMPTY_MATCH;
        let mut taint = None;
        for &item in items {
            let (info, t) = self.compute(item);
            acc.first.union_with(&info.first);
            taint = min_taint(taint, t);
            if !info.nullable {
                acc.nullable = false;
                break;
            }
        }
        (acc, taint)
    }

    fn compute_rule(&mut self, rule: RuleId) -> (FirstInfo, Taint) {
        if let Some(entered_at) = self.in_progress[rule.index()] {
            trace!(
                rule = self.grammar.rule_name(rule),
                "FIRST re-entered a rule in progress, contributing the empty set"
            );
            if !self.approximated.contains(&rule) {
                self.approximated.push(rule);
            }
            return (FirstInfo::default(), Some(entered_at));
        }

        let body = self.grammar.rule(rule).body;
        if let Some(info) = self.memo.get(&body) {
            return (*info, None);
        }

        let depth = self.depth;
        self.depth += 1;
        self.in_progress[rule.index()] = Some(depth);
        let (info, taint) = self.compute(body);
        self.in_progress[rule.index()] = None;
        self.depth -= 1;

        // Re-entries of this rule are resolved now that it is finished.
        let taint = taint.filter(|&t| t < depth);
        if taint.is_none() {
            self.memo.insert(body, info);
        }
        trace!(
            rule = self.grammar.rule_name(rule),
            first = ?info.first,
            nullable = info.nullable,
            "computed rule FIRST"
        );
        (info, taint)
    }
}

fn min_taint(a: Taint, b: Taint) -> Taint {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// FIRST of a single node, with a throwaway memo.
pub fn first(grammar: &Grammar, node: NodeId) -> TerminalSet {
    FirstSets::new(grammar).first(node)
}

/// Frozen FIRST results of a fully analyzed grammar.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FirstSetCache {
    nodes: FxHashMap<NodeId, FirstInfo>,
    rules: Vec<FirstInfo>,
    approximated: Vec<RuleId>,
}

impl FirstSetCache {
    /// Memoized result for a node, if the analysis visited it.
    pub fn node(&self, node: NodeId) -> Option<FirstInfo> {
        self.nodes.get(&node).copied()
    }

    /// FIRST set and nullability of a rule.
    ///
    /// # Panics
    ///
    /// Panics if `rule` does not belong to the analyzed grammar.
    pub fn rule(&self, rule: RuleId) -> FirstInfo {
        self.rules[rule.index()]
    }

    /// Rules on a left-recursive cycle, where FIRST is approximated.
    pub fn approximated_rules(&self) -> &[RuleId] {
        &self.approximated
    }

    pub fn memoized_nodes(&self) -> usize {
        self.nodes.len()
    }
}
