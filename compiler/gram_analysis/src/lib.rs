//! Grammar analysis.
//!
//! Everything here runs once per grammar, before any input is parsed:
//!
//! - [`first`]: FIRST sets and nullability, with the left-recursion
//!   approximation made observable.
//! - [`rest`]: the walker that hands each terminal and rule reference the
//!   rest of its enclosing rule.
//! - [`follow`]: resync follow sets per rule reference and in-rule follow
//!   sets per terminal occurrence.
//! - [`analysis`]: the write-once, process-wide cache of analyzed grammars.

pub mod analysis;
pub mod first;
pub mod follow;
pub mod rest;
mod stack;

pub use analysis::{
    ensure_analyzed, AnalysisCache, AnalysisState, AnalyzedGrammar, GrammarDefinition, GrammarId,
};
pub use first::{first, FirstInfo, FirstSetCache, FirstSets};
pub use follow::{
    compute_all_rules_follows, compute_in_rule_follows, FollowTable, InRuleFollowsWalker,
    ResyncFollowsWalker, SetTable, TableKey, TerminalFollowTable,
};
pub use rest::{Rest, RestEntry, RestWalker};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber driven by `RUST_LOG`.
///
/// - `RUST_LOG=gram_analysis=debug` - analysis and cache events
/// - `RUST_LOG=gram_analysis::first=trace` - every rule FIRST computation
/// - `RUST_LOG=gram_parse=debug` - speculation and recovery
///
/// Does nothing when `RUST_LOG` is unset or unparsable, or when the host
/// program already installed a global subscriber. Only the first call
/// does any work.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!("gram tracing enabled");
        }
    });
}
