//! Error recovery: skipping tokens until a resync point.
//!
//! When a sub-rule fails, the union of the follow sets of every rule on the
//! rule stack says which tokens some active rule could continue from. The
//! first such token in the input is the resync point.

use crate::Cursor;
use gram_ir::{TerminalKind, TerminalSet};

/// Advance the cursor until reaching a token in the recovery set.
///
/// Returns `true` if a recovery token was found, `false` if the end of input
/// was reached.
pub fn synchronize(cursor: &mut Cursor<'_>, recovery: TerminalSet) -> bool {
    synchronize_counted(cursor, recovery).is_some()
}

/// Like [`synchronize`], counting the skipped tokens.
///
/// Returns `Some(count)` if a recovery token was found, `None` if the end of
/// input was reached.
pub fn synchronize_counted(cursor: &mut Cursor<'_>, recovery: TerminalSet) -> Option<usize> {
    let mut count = 0;
    while let Some(kind) = cursor.current_kind() {
        if recovery.contains(kind) {
            return Some(count);
        }
        cursor.advance();
        count += 1;
    }
    None
}

/// Find the first token in the recovery set without moving the cursor.
///
/// Returns the number of tokens before it and its kind.
pub fn find_resync_point(cursor: &Cursor<'_>, recovery: TerminalSet) -> Option<(usize, TerminalKind)> {
    (0..)
        .map_while(|n| cursor.peek_kind_at(n).map(|kind| (n, kind)))
        .find(|&(_, kind)| recovery.contains(kind))
}
