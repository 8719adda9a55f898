//! Grammar construction.
//!
//! Rule bodies are written as [`Expr`] trees and lowered into the node arena
//! when the rule is declared. Lowering is where occurrence indices get
//! assigned: every rule reference and every terminal consumption receives the
//! next free 1-based index for its target within the enclosing rule, unless
//! the author pinned one explicitly with `subrule_n` / `consume_n`.
//!
//! Rule references are resolved by name and may point at rules declared
//! later, which is how mutually recursive grammars are written. Completeness
//! is checked once, in [`GrammarBuilder::build`].

use super::{Grammar, RuleDef};
use crate::production::Children;
use crate::{
    NodeId, Production, RepetitionKind, RuleId, StructuralError, TerminalKind, TerminalRegistry,
};
use rustc_hash::FxHashMap;

/// A rule body as written by the grammar author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Consume {
        kind: TerminalKind,
        occurrence: Option<u32>,
    },
    Subrule {
        name: String,
        occurrence: Option<u32>,
    },
    Sequence(Vec<Expr>),
    Or(Vec<Expr>),
    Repeat {
        kind: RepetitionKind,
        body: Box<Expr>,
        separator: Option<TerminalKind>,
    },
    Flat(Vec<Expr>),
}

impl Expr {
    pub fn consume(kind: TerminalKind) -> Self {
        Expr::Consume {
            kind,
            occurrence: None,
        }
    }

    /// Consume with a pinned occurrence index.
    pub fn consume_n(kind: TerminalKind, occurrence: u32) -> Self {
        Expr::Consume {
            kind,
            occurrence: Some(occurrence),
        }
    }

    pub fn subrule(name: impl Into<String>) -> Self {
        Expr::Subrule {
            name: name.into(),
            occurrence: None,
        }
    }

    /// Rule reference with a pinned occurrence index.
    pub fn subrule_n(name: impl Into<String>, occurrence: u32) -> Self {
        Expr::Subrule {
            name: name.into(),
            occurrence: Some(occurrence),
        }
    }

    pub fn seq(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Sequence(items.into_iter().collect())
    }

    pub fn or(branches: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(branches.into_iter().collect())
    }

    pub fn flat(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Flat(items.into_iter().collect())
    }

    pub fn option(body: Expr) -> Self {
        Self::repeat(RepetitionKind::Optional, body, None)
    }

    pub fn many(body: Expr) -> Self {
        Self::repeat(RepetitionKind::ZeroOrMore, body, None)
    }

    pub fn at_least_one(body: Expr) -> Self {
        Self::repeat(RepetitionKind::OneOrMore, body, None)
    }

    /// Zero or more `body`s separated by `separator`.
    pub fn many_sep(body: Expr, separator: TerminalKind) -> Self {
        Self::repeat(RepetitionKind::ZeroOrMore, body, Some(separator))
    }

    /// One or more `body`s separated by `separator`.
    pub fn at_least_one_sep(body: Expr, separator: TerminalKind) -> Self {
        Self::repeat(RepetitionKind::OneOrMore, body, Some(separator))
    }

    fn repeat(kind: RepetitionKind, body: Expr, separator: Option<TerminalKind>) -> Self {
        Expr::Repeat {
            kind,
            body: Box::new(body),
            separator,
        }
    }
}

/// Per-rule declaration options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleOptions {
    pub resync_enabled: bool,
}

impl RuleOptions {
    /// Options for a rule that never resyncs; failures always propagate to
    /// the caller.
    pub const fn without_resync() -> Self {
        RuleOptions {
            resync_enabled: false,
        }
    }
}

impl Default for RuleOptions {
    fn default() -> Self {
        RuleOptions {
            resync_enabled: true,
        }
    }
}

/// Occurrence indices claimed so far inside the rule being lowered.
#[derive(Default)]
struct Occurrences {
    rules: FxHashMap<RuleId, Vec<u32>>,
    terminals: FxHashMap<TerminalKind, Vec<u32>>,
}

enum Claim {
    Ok(u32),
    Zero,
    Duplicate(u32),
}

fn claim(claimed: &mut Vec<u32>, requested: Option<u32>) -> Claim {
    let index = match requested {
        Some(0) => return Claim::Zero,
        Some(n) => n,
        None => claimed.iter().max().map_or(1, |max| max + 1),
    };
    if claimed.contains(&index) {
        return Claim::Duplicate(index);
    }
    claimed.push(index);
    Claim::Ok(index)
}

/// Mutable grammar under construction.
pub struct GrammarBuilder {
    name: String,
    terminals: TerminalRegistry,
    nodes: Vec<Production>,
    /// `None` while a rule is only known through forward references.
    rules: Vec<Option<RuleDef>>,
    rule_names: FxHashMap<String, RuleId>,
    names: Vec<String>,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        GrammarBuilder {
            name: name.into(),
            terminals: TerminalRegistry::new(),
            nodes: Vec::new(),
            rules: Vec::new(),
            rule_names: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    /// Register a terminal kind.
    pub fn terminal(&mut self, name: &str) -> Result<TerminalKind, StructuralError> {
        self.terminals.register(name)
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    /// Declare a rule with default options.
    pub fn rule(&mut self, name: &str, body: Expr) -> Result<RuleId, StructuralError> {
        self.rule_with(name, body, RuleOptions::default())
    }

    /// Declare a rule.
    ///
    /// The rule's id is registered before its body is lowered, so the body
    /// may refer to the rule itself.
    pub fn rule_with(
        &mut self,
        name: &str,
        body: Expr,
        options: RuleOptions,
    ) -> Result<RuleId, StructuralError> {
        let id = self.declare(name);
        if self.rules[id.index()].is_some() {
            return Err(StructuralError::DuplicateRule {
                grammar: self.name.clone(),
                name: name.to_string(),
            });
        }

        let mut occurrences = Occurrences::default();
        let body = self.lower(&body, id, &mut occurrences)?;
        self.rules[id.index()] = Some(RuleDef {
            name: name.to_string(),
            body,
            resync_enabled: options.resync_enabled,
        });
        Ok(id)
    }

    /// Get the id for `name`, registering it as a forward reference if the
    /// rule has not been seen yet.
    pub fn declare(&mut self, name: &str) -> RuleId {
        if let Some(&id) = self.rule_names.get(name) {
            return id;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "rule count is far below u32::MAX"
        )]
        let id = RuleId::new(self.rules.len() as u32);
        self.rules.push(None);
        self.names.push(name.to_string());
        self.rule_names.insert(name.to_string(), id);
        id
    }

    /// Whether a rule body has been declared for `name`.
    pub fn is_declared(&self, name: &str) -> bool {
        self.rule_names
            .get(name)
            .is_some_and(|id| self.rules[id.index()].is_some())
    }

    /// Names referenced somewhere but not declared yet, sorted.
    pub fn missing_rules(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .rules
            .iter()
            .zip(&self.names)
            .filter(|(slot, _)| slot.is_none())
            .map(|(_, name)| name.clone())
            .collect();
        missing.sort();
        missing
    }

    /// Freeze the grammar.
    ///
    /// Fails with [`StructuralError::PrematureAnalysis`] if any referenced
    /// rule is still undeclared.
    pub fn build(self) -> Result<Grammar, StructuralError> {
        let missing = self.missing_rules();
        if !missing.is_empty() {
            return Err(StructuralError::PrematureAnalysis {
                grammar: self.name,
                missing,
            });
        }

        let rules: Vec<RuleDef> = self.rules.into_iter().flatten().collect();
        Ok(Grammar {
            name: self.name,
            terminals: self.terminals,
            nodes: self.nodes,
            rules,
            rule_names: self.rule_names,
        })
    }

    fn push(&mut self, prod: Production) -> NodeId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "node count is far below u32::MAX"
        )]
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(prod);
        id
    }

    fn lower(
        &mut self,
        expr: &Expr,
        enclosing: RuleId,
        occ: &mut Occurrences,
    ) -> Result<NodeId, StructuralError> {
        let prod = match expr {
            Expr::Consume { kind, occurrence } => {
                return self.lower_terminal(*kind, *occurrence, enclosing, occ);
            }
            Expr::Subrule { name, occurrence } => {
                let rule = self.declare(name);
                let claimed = occ.rules.entry(rule).or_default();
                let occurrence = self.check_claim(claim(claimed, *occurrence), enclosing, name)?;
                Production::NonTerminal { rule, occurrence }
            }
            Expr::Sequence(items) => Production::Sequence(self.lower_all(items, enclosing, occ)?),
            Expr::Or(branches) => {
                Production::Alternation(self.lower_all(branches, enclosing, occ)?)
            }
            Expr::Flat(items) => Production::Flat(self.lower_all(items, enclosing, occ)?),
            Expr::Repeat {
                kind,
                body,
                separator,
            } => {
                let body = self.lower(body, enclosing, occ)?;
                let separator = match separator {
                    Some(sep) => Some(self.lower_terminal(*sep, None, enclosing, occ)?),
                    None => None,
                };
                Production::Repetition {
                    kind: *kind,
                    body,
                    separator,
                }
            }
        };
        Ok(self.push(prod))
    }

    fn lower_all(
        &mut self,
        items: &[Expr],
        enclosing: RuleId,
        occ: &mut Occurrences,
    ) -> Result<Children, StructuralError> {
        items
            .iter()
            .map(|item| self.lower(item, enclosing, occ))
            .collect()
    }

    fn lower_terminal(
        &mut self,
        kind: TerminalKind,
        requested: Option<u32>,
        enclosing: RuleId,
        occ: &mut Occurrences,
    ) -> Result<NodeId, StructuralError> {
        let claimed = occ.terminals.entry(kind).or_default();
        let target = self.terminals.name(kind).to_string();
        let occurrence = self.check_claim(claim(claimed, requested), enclosing, &target)?;
        Ok(self.push(Production::Terminal { kind, occurrence }))
    }

    fn check_claim(
        &self,
        claim: Claim,
        enclosing: RuleId,
        target: &str,
    ) -> Result<u32, StructuralError> {
        match claim {
            Claim::Ok(index) => Ok(index),
            Claim::Zero => Err(StructuralError::ZeroOccurrence {
                enclosing: self.names[enclosing.index()].clone(),
                target: target.to_string(),
            }),
            Claim::Duplicate(occurrence) => Err(StructuralError::DuplicateOccurrence {
                enclosing: self.names[enclosing.index()].clone(),
                target: target.to_string(),
                occurrence,
            }),
        }
    }
}
