//! Production nodes.

use crate::{NodeId, RuleId, TerminalKind};
use smallvec::SmallVec;

/// Children of a composite node. Most sequences and alternations are short.
pub type Children = SmallVec<[NodeId; 4]>;

/// How often a repetition body may match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RepetitionKind {
    /// Zero or one time.
    Optional,
    /// Zero or more times.
    ZeroOrMore,
    /// One or more times.
    OneOrMore,
}

impl RepetitionKind {
    /// Whether the repetition as a whole can match the empty input.
    #[inline]
    pub const fn allows_empty(self) -> bool {
        !matches!(self, RepetitionKind::OneOrMore)
    }

    /// Whether the body may run again after one iteration.
    #[inline]
    pub const fn repeats(self) -> bool {
        !matches!(self, RepetitionKind::Optional)
    }
}

/// One node of a rule body.
///
/// Nodes live in the grammar's arena and refer to each other by [`NodeId`].
/// Rule references refer to rules by [`RuleId`], so recursive grammars are
/// plain cycles in the id graph rather than in ownership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Production {
    /// Match one token of `kind`. `occurrence` is the 1-based index of this
    /// consumption among consumptions of the same kind in the enclosing rule.
    Terminal { kind: TerminalKind, occurrence: u32 },

    /// Invoke another rule. `occurrence` is the 1-based index of this
    /// reference among references to the same rule in the enclosing rule.
    NonTerminal { rule: RuleId, occurrence: u32 },

    Sequence(Children),

    /// Ordered choice between branches.
    Alternation(Children),

    /// `body` repeated according to `kind`. A separator, when present, is a
    /// terminal node matched between iterations.
    Repetition {
        kind: RepetitionKind,
        body: NodeId,
        separator: Option<NodeId>,
    },

    /// A sequence spliced together from fragments rather than written by
    /// the grammar author. Analyses treat it exactly like a `Sequence`.
    Flat(Children),
}

impl Production {
    /// Child nodes in declaration order, including a repetition's separator.
    pub fn children(&self) -> SmallVec<[NodeId; 4]> {
        match self {
            Production::Terminal { .. } | Production::NonTerminal { .. } => SmallVec::new(),
            Production::Sequence(items)
            | Production::Alternation(items)
            | Production::Flat(items) => items.clone(),
            Production::Repetition {
                body, separator, ..
            } => {
                let mut out = SmallVec::new();
                out.push(*body);
                if let Some(sep) = separator {
                    out.push(*sep);
                }
                out
            }
        }
    }
}
