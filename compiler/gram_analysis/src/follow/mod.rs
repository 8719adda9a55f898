//! Resync follow sets.
//!
//! For every rule reference in the grammar, the set of terminal kinds that
//! may legally come right after it *within its enclosing rule*. When a
//! sub-rule fails, the runtime discards tokens until one of these shows up
//! and resumes the enclosing rule from there.
//!
//! A second walker computes the same thing for terminal consumptions; the
//! runtime uses those sets for single-token insertion.

use crate::first::FirstSets;
use crate::rest::{RestEntry, RestWalker};
use gram_ir::{
    FollowKey, Grammar, RuleId, StructuralError, TerminalKey, TerminalKind, TerminalSet,
};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use tracing::{debug, trace};

/// A key that can be rendered for diagnostics.
pub trait TableKey: Copy + Eq + Hash + Ord {
    fn render(&self, grammar: &Grammar) -> String;
}

impl TableKey for FollowKey {
    fn render(&self, grammar: &Grammar) -> String {
        self.display(grammar).to_string()
    }
}

impl TableKey for TerminalKey {
    fn render(&self, grammar: &Grammar) -> String {
        self.display(grammar).to_string()
    }
}

/// Immutable-after-analysis mapping from a key to a set of terminal kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetTable<K: TableKey> {
    entries: FxHashMap<K, TerminalSet>,
}

/// Between-rules follow sets, keyed by reference occurrence.
pub type FollowTable = SetTable<FollowKey>;

/// In-rule follow sets, keyed by terminal occurrence.
pub type TerminalFollowTable = SetTable<TerminalKey>;

impl<K: TableKey> Default for SetTable<K> {
    fn default() -> Self {
        SetTable {
            entries: FxHashMap::default(),
        }
    }
}

impl<K: TableKey> SetTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<TerminalSet> {
        self.entries.get(key).copied()
    }

    /// Look up a key that must exist.
    ///
    /// Every reference in an analyzed grammar has an entry, so a miss means
    /// the caller built a key the analysis never saw.
    pub fn lookup(&self, key: &K, grammar: &Grammar) -> Result<TerminalSet, StructuralError> {
        self.get(key).ok_or_else(|| StructuralError::MissingFollowKey {
            key: key.render(grammar),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn sorted(&self) -> Vec<(K, TerminalSet)> {
        let mut out: Vec<_> = self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        out.sort_by_key(|(k, _)| *k);
        out
    }

    /// Insert a new entry; a key may only be recorded once.
    pub fn insert(
        &mut self,
        key: K,
        set: TerminalSet,
        grammar: &Grammar,
    ) -> Result<(), StructuralError> {
        if self.entries.insert(key, set).is_some() {
            return Err(StructuralError::DuplicateFollowKey {
                key: key.render(grammar),
            });
        }
        Ok(())
    }

    /// Disjoint union with another table.
    pub fn merge(&mut self, other: Self, grammar: &Grammar) -> Result<(), StructuralError> {
        self.entries.reserve(other.entries.len());
        for (key, set) in other.entries {
            self.insert(key, set, grammar)?;
        }
        Ok(())
    }
}

/// Records, for every rule reference inside one rule, the FIRST of the
/// rest that follows it.
pub struct ResyncFollowsWalker<'g, 'f> {
    top: RuleId,
    first: &'f mut FirstSets<'g>,
    follows: FollowTable,
    error: Option<StructuralError>,
}

impl<'g, 'f> ResyncFollowsWalker<'g, 'f> {
    pub fn new(top: RuleId, first: &'f mut FirstSets<'g>) -> Self {
        ResyncFollowsWalker {
            top,
            first,
            follows: FollowTable::new(),
            error: None,
        }
    }

    pub fn start_walking(mut self) -> Result<FollowTable, StructuralError> {
        self.walk_rule(self.top);
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.follows),
        }
    }
}

impl<'g> RestWalker<'g> for ResyncFollowsWalker<'g, '_> {
    fn grammar(&self) -> &'g Grammar {
        self.first.grammar()
    }

    // Terminals need no resync entry.

    fn walk_rule_ref(
        &mut self,
        rule: RuleId,
        occurrence: u32,
        curr_rest: &[RestEntry],
        prev_rest: &[RestEntry],
    ) {
        let grammar = self.grammar();
        let key = FollowKey::new(rule, occurrence, self.top);
        let mut full: Vec<RestEntry> = Vec::with_capacity(curr_rest.len() + prev_rest.len());
        full.extend_from_slice(curr_rest);
        full.extend_from_slice(prev_rest);
        let follows = self.first.first_of_rest(&full).first;
        trace!(key = %key.display(grammar), ?follows, "recorded resync follows");

        if let Err(err) = self.follows.insert(key, follows, grammar) {
            self.error.get_or_insert(err);
        }
    }
}

/// Records, for every terminal consumption inside one rule, the FIRST of
/// the rest that follows it.
pub struct InRuleFollowsWalker<'g, 'f> {
    top: RuleId,
    first: &'f mut FirstSets<'g>,
    follows: TerminalFollowTable,
    error: Option<StructuralError>,
}

impl<'g, 'f> InRuleFollowsWalker<'g, 'f> {
    pub fn new(top: RuleId, first: &'f mut FirstSets<'g>) -> Self {
        InRuleFollowsWalker {
            top,
            first,
            follows: TerminalFollowTable::new(),
            error: None,
        }
    }

    pub fn start_walking(mut self) -> Result<TerminalFollowTable, StructuralError> {
        self.walk_rule(self.top);
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.follows),
        }
    }
}

impl<'g> RestWalker<'g> for InRuleFollowsWalker<'g, '_> {
    fn grammar(&self) -> &'g Grammar {
        self.first.grammar()
    }

    fn walk_terminal(
        &mut self,
        kind: TerminalKind,
        occurrence: u32,
        curr_rest: &[RestEntry],
        prev_rest: &[RestEntry],
    ) {
        let grammar = self.grammar();
        let key = TerminalKey::new(kind, occurrence, self.top);
        let mut full: Vec<RestEntry> = Vec::with_capacity(curr_rest.len() + prev_rest.len());
        full.extend_from_slice(curr_rest);
        full.extend_from_slice(prev_rest);
        let follows = self.first.first_of_rest(&full).first;

        if let Err(err) = self.follows.insert(key, follows, grammar) {
            self.error.get_or_insert(err);
        }
    }
}

/// Follow sets of every rule reference in the grammar.
///
/// Each rule is walked on its own and the per-rule tables are merged. Keys
/// carry the enclosing rule, so the merge is a disjoint union; a collision
/// is reported as [`StructuralError::DuplicateFollowKey`].
pub fn compute_all_rules_follows(first: &mut FirstSets<'_>) -> Result<FollowTable, StructuralError> {
    let grammar = first.grammar();
    let mut all = FollowTable::new();
    for (rule, def) in grammar.rules() {
        let follows = ResyncFollowsWalker::new(rule, first).start_walking()?;
        trace!(rule = %def.name, entries = follows.len(), "walked rule for resync follows");
        all.merge(follows, grammar)?;
    }
    debug!(grammar = grammar.name(), entries = all.len(), "computed resync follows");
    Ok(all)
}

/// Follow sets of every terminal consumption in the grammar.
pub fn compute_in_rule_follows(
    first: &mut FirstSets<'_>,
) -> Result<TerminalFollowTable, StructuralError> {
    let grammar = first.grammar();
    let mut all = TerminalFollowTable::new();
    for (rule, _) in grammar.rules() {
        let follows = InRuleFollowsWalker::new(rule, first).start_walking()?;
        all.merge(follows, grammar)?;
    }
    debug!(grammar = grammar.name(), entries = all.len(), "computed in-rule follows");
    Ok(all)
}

#[cfg(test)]
mod tests;
