//! Sets of terminal kinds.
//!
//! FIRST sets, follow sets and recovery sets are all `TerminalSet`s. Each bit
//! of the backing `u128` corresponds to a [`TerminalKind`] index, so
//! membership, union and intersection are single bitwise operations.

use crate::{TerminalKind, TerminalRegistry};
use std::fmt;

/// A set of terminal kinds using bitset representation for O(1) membership testing.
///
/// # Example
/// ```ignore
/// let follows = TerminalSet::new().with(equals).with(default);
///
/// if follows.contains(current) {
///     // resync point found
/// }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TerminalSet(u128);

impl TerminalSet {
    /// Create an empty set.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create a set containing a single kind.
    #[inline]
    pub const fn single(kind: TerminalKind) -> Self {
        Self(1u128 << kind.index())
    }

    /// Add a kind to this set (builder pattern for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: TerminalKind) -> Self {
        Self(self.0 | (1u128 << kind.index()))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub const fn contains(&self, kind: TerminalKind) -> bool {
        (self.0 & (1u128 << kind.index())) != 0
    }

    /// Check whether every kind in `self` is also in `other`.
    #[inline]
    pub const fn is_subset(&self, other: &Self) -> bool {
        self.0 & !other.0 == 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Count the number of kinds in this set.
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Add a kind to this set (non-const mutation).
    #[inline]
    pub fn insert(&mut self, kind: TerminalKind) {
        self.0 |= 1u128 << kind.index();
    }

    /// Union with another set (non-const mutation).
    #[inline]
    pub fn union_with(&mut self, other: &Self) {
        self.0 |= other.0;
    }

    /// Iterate over the kinds in this set, lowest index first.
    pub fn iter(&self) -> TerminalSetIter {
        TerminalSetIter { bits: self.0 }
    }

    /// Format this set as a human-readable list for error messages.
    ///
    /// Returns a string like "`Comma`, `RParen`, or `Semi`" for multiple
    /// kinds, "`Ident`" for a single one, or "nothing" for the empty set.
    pub fn format_expected(&self, registry: &TerminalRegistry) -> String {
        let names: Vec<&str> = self.iter().map(|kind| registry.name(kind)).collect();

        match names.as_slice() {
            [] => "nothing".to_string(),
            [single] => format!("`{single}`"),
            [first, second] => format!("`{first}` or `{second}`"),
            [rest @ .., last] => {
                let rest_str = rest
                    .iter()
                    .map(|n| format!("`{n}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{rest_str}, or `{last}`")
            }
        }
    }
}

impl fmt::Debug for TerminalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(TerminalKind::index)).finish()
    }
}

impl FromIterator<TerminalKind> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = TerminalKind>>(iter: I) -> Self {
        let mut set = TerminalSet::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TerminalSet {
    type Item = TerminalKind;
    type IntoIter = TerminalSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the kinds in a `TerminalSet`.
pub struct TerminalSetIter {
    bits: u128,
}

impl Iterator for TerminalSetIter {
    type Item = TerminalKind;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let idx = self.bits.trailing_zeros();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "u128::trailing_zeros() max is 127"
        )]
        let idx = idx as u8;
        self.bits &= self.bits - 1; // Clear the lowest set bit
        Some(TerminalKind::from_index(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.bits.count_ones() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for TerminalSetIter {}
