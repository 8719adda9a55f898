//! Self-analysis: analyze a grammar once per process and share the result.
//!
//! A grammar type declares its rules through [`GrammarDefinition`]. The first
//! parser instance that needs the analysis runs it; every later instance of
//! the same grammar gets the same [`Arc<AnalyzedGrammar>`].
//!
//! Per grammar identity the cache moves through
//! `NotAnalyzed -> Analyzing -> Analyzed`. A failed or panicking analysis
//! drops back to `NotAnalyzed` so the error is reported again on the next
//! attempt instead of being cached.

use crate::first::{FirstSetCache, FirstSets};
use crate::follow::{
    compute_all_rules_follows, compute_in_rule_follows, FollowTable, TerminalFollowTable,
};
use gram_ir::{
    FollowKey, Grammar, GrammarBuilder, RuleId, StructuralError, TerminalKey, TerminalKind,
    TerminalSet,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Process-wide identity of a grammar.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct GrammarId {
    type_id: TypeId,
    name: &'static str,
}

impl GrammarId {
    /// Identity of the grammar declared by `G`.
    pub fn of<G: GrammarDefinition>() -> Self {
        GrammarId {
            type_id: TypeId::of::<G>(),
            name: G::NAME,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for GrammarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrammarId({})", self.name)
    }
}

/// A grammar declared in code.
pub trait GrammarDefinition: 'static {
    /// Grammar name, used in diagnostics.
    const NAME: &'static str;

    /// Register terminals and declare every rule.
    fn define(builder: &mut GrammarBuilder) -> Result<(), StructuralError>;

    /// Run [`define`](Self::define) on a fresh builder and freeze the result.
    fn build() -> Result<Grammar, StructuralError> {
        let mut builder = GrammarBuilder::new(Self::NAME);
        Self::define(&mut builder)?;
        builder.build()
    }
}

/// A grammar together with everything derived from it.
#[derive(Debug)]
pub struct AnalyzedGrammar {
    grammar: Grammar,
    first: FirstSetCache,
    follows: FollowTable,
    in_rule_follows: TerminalFollowTable,
}

impl AnalyzedGrammar {
    /// Run the full analysis over a frozen grammar.
    pub fn analyze(grammar: Grammar) -> Result<Self, StructuralError> {
        let mut first = FirstSets::new(&grammar);
        let follows = compute_all_rules_follows(&mut first)?;
        let in_rule_follows = compute_in_rule_follows(&mut first)?;
        let first = first.finish();
        debug!(
            grammar = grammar.name(),
            rules = grammar.rule_count(),
            follows = follows.len(),
            in_rule_follows = in_rule_follows.len(),
            approximated = first.approximated_rules().len(),
            "analyzed grammar"
        );
        Ok(AnalyzedGrammar {
            grammar,
            first,
            follows,
            in_rule_follows,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_sets(&self) -> &FirstSetCache {
        &self.first
    }

    pub fn follows(&self) -> &FollowTable {
        &self.follows
    }

    pub fn in_rule_follows(&self) -> &TerminalFollowTable {
        &self.in_rule_follows
    }

    /// FIRST set of a rule.
    pub fn first_of_rule(&self, rule: RuleId) -> TerminalSet {
        self.first.rule(rule).first
    }

    /// Resync follow set of the `occurrence`-th reference to `rule` inside
    /// `enclosing`.
    pub fn rule_follows(
        &self,
        rule: RuleId,
        occurrence: u32,
        enclosing: RuleId,
    ) -> Result<TerminalSet, StructuralError> {
        self.follows
            .lookup(&FollowKey::new(rule, occurrence, enclosing), &self.grammar)
    }

    /// Follow set of the `occurrence`-th consumption of `terminal` inside
    /// `enclosing`.
    pub fn terminal_follows(
        &self,
        terminal: TerminalKind,
        occurrence: u32,
        enclosing: RuleId,
    ) -> Result<TerminalSet, StructuralError> {
        self.in_rule_follows
            .lookup(&TerminalKey::new(terminal, occurrence, enclosing), &self.grammar)
    }

    /// Rules whose FIRST set is approximated because of left recursion.
    pub fn approximated_rules(&self) -> &[RuleId] {
        self.first.approximated_rules()
    }
}

/// Where one grammar stands in the cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnalysisState {
    NotAnalyzed,
    Analyzing,
    Analyzed,
}

enum Slot {
    Analyzing,
    Analyzed(Arc<AnalyzedGrammar>),
}

/// Write-once cache of analyzed grammars, keyed by grammar identity.
///
/// Analysis runs outside the lock. If two threads analyze the same grammar
/// concurrently, the first to publish wins and the other adopts its result,
/// so every caller observes one complete, immutable analysis.
pub struct AnalysisCache {
    slots: RwLock<FxHashMap<GrammarId, Slot>>,
    hits: AtomicUsize,
    analyses: AtomicUsize,
}

impl AnalysisCache {
    pub fn new() -> Self {
        AnalysisCache {
            slots: RwLock::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            analyses: AtomicUsize::new(0),
        }
    }

    /// The process-wide cache.
    pub fn global() -> &'static AnalysisCache {
        static GLOBAL_CACHE: OnceLock<AnalysisCache> = OnceLock::new();
        GLOBAL_CACHE.get_or_init(AnalysisCache::new)
    }

    pub fn state(&self, id: GrammarId) -> AnalysisState {
        match self.slots.read().get(&id) {
            None => AnalysisState::NotAnalyzed,
            Some(Slot::Analyzing) => AnalysisState::Analyzing,
            Some(Slot::Analyzed(_)) => AnalysisState::Analyzed,
        }
    }

    /// The published analysis, if any.
    pub fn get(&self, id: GrammarId) -> Option<Arc<AnalyzedGrammar>> {
        match self.slots.read().get(&id) {
            Some(Slot::Analyzed(analyzed)) => Some(Arc::clone(analyzed)),
            _ => None,
        }
    }

    /// Number of calls answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of analyses published.
    pub fn analyses(&self) -> usize {
        self.analyses.load(Ordering::Relaxed)
    }

    /// Analyze the grammar `G` unless it already is.
    pub fn ensure_analyzed<G: GrammarDefinition>(
        &self,
    ) -> Result<Arc<AnalyzedGrammar>, StructuralError> {
        self.ensure_analyzed_with(GrammarId::of::<G>(), G::build)
    }

    /// Analyze the grammar produced by `build` unless `id` already is.
    ///
    /// `build` only runs on a cache miss.
    pub fn ensure_analyzed_with(
        &self,
        id: GrammarId,
        build: impl FnOnce() -> Result<Grammar, StructuralError>,
    ) -> Result<Arc<AnalyzedGrammar>, StructuralError> {
        // Fast path: read lock only.
        if let Some(analyzed) = self.get(id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(grammar = id.name, "analysis cache hit");
            return Ok(analyzed);
        }

        {
            let mut slots = self.slots.write();
            // Double-check after acquiring the write lock.
            if let Some(Slot::Analyzed(analyzed)) = slots.get(&id) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(analyzed));
            }
            slots.entry(id).or_insert(Slot::Analyzing);
        }
        debug!(grammar = id.name, "analysis cache miss");

        // Clears the `Analyzing` marker on every exit that does not publish,
        // including a panic in `build`.
        let _pending = PendingSlot {
            slots: &self.slots,
            id,
        };
        let analyzed = match build().and_then(AnalyzedGrammar::analyze) {
            Ok(analyzed) => analyzed,
            Err(err) => {
                debug!(grammar = id.name, error = %err, "analysis failed");
                return Err(err);
            }
        };

        let mut slots = self.slots.write();
        if let Some(Slot::Analyzed(published)) = slots.get(&id) {
            return Ok(Arc::clone(published));
        }
        let analyzed = Arc::new(analyzed);
        slots.insert(id, Slot::Analyzed(Arc::clone(&analyzed)));
        self.analyses.fetch_add(1, Ordering::Relaxed);
        debug!(grammar = id.name, "published analysis");
        Ok(analyzed)
    }
}

/// An `Analyzing` marker owned by one in-flight analysis.
struct PendingSlot<'c> {
    slots: &'c RwLock<FxHashMap<GrammarId, Slot>>,
    id: GrammarId,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        let mut slots = self.slots.write();
        if matches!(slots.get(&self.id), Some(Slot::Analyzing)) {
            slots.remove(&self.id);
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze `G` through the process-wide cache.
pub fn ensure_analyzed<G: GrammarDefinition>() -> Result<Arc<AnalyzedGrammar>, StructuralError> {
    AnalysisCache::global().ensure_analyzed::<G>()
}
