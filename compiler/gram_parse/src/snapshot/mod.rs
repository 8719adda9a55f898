//! Parser snapshots for speculative parsing.
//!
//! A snapshot is taken before a speculative attempt and restored after it,
//! whether the attempt succeeded, failed, or was rejected by its predicate.
//! Restoring rolls back everything the attempt could have changed:
//!
//! - the cursor position,
//! - errors recorded since the snapshot,
//! - rule frames pushed since the snapshot.
//!
//! Snapshots nest. Each speculation level holds its own snapshot on the
//! Rust stack and restores it before returning, so restores happen in LIFO
//! order.

/// A lightweight snapshot of parser state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserSnapshot {
    /// Position in the token stream.
    pub(crate) cursor_pos: usize,
    /// Number of recorded errors.
    pub(crate) error_count: usize,
    /// Depth of the rule stack.
    pub(crate) rule_depth: usize,
}

impl ParserSnapshot {
    #[inline]
    pub(crate) fn new(cursor_pos: usize, error_count: usize, rule_depth: usize) -> Self {
        Self {
            cursor_pos,
            error_count,
            rule_depth,
        }
    }

    /// Token position the snapshot restores to.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor_pos
    }
}
