//! Terminal kinds and the registry that names them.

use crate::StructuralError;
use rustc_hash::FxHashMap;
use std::fmt;

/// A category of token, e.g. `Number` or `Ident`.
///
/// Kinds are ordered by registration index. The index doubles as the bit
/// position in a [`TerminalSet`](crate::TerminalSet), so a grammar holds at
/// most [`TerminalKind::MAX`] kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalKind(u8);

impl TerminalKind {
    /// Maximum number of terminal kinds per grammar.
    pub const MAX: usize = 128;

    /// Create a kind from its registration index.
    ///
    /// Only indices below [`TerminalKind::MAX`] are meaningful; the registry
    /// is the normal way to obtain kinds.
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        debug_assert!((index as usize) < Self::MAX);
        TerminalKind(index)
    }

    /// Bit index of this kind inside a `TerminalSet`.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TerminalKind({})", self.0)
    }
}

/// Maps terminal kinds to their names.
///
/// Names are only used for diagnostics and for the string projection of
/// follow keys; analysis works on the kinds themselves.
#[derive(Clone, Debug, Default)]
pub struct TerminalRegistry {
    names: Vec<String>,
    by_name: FxHashMap<String, TerminalKind>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new terminal kind under `name`.
    pub fn register(&mut self, name: &str) -> Result<TerminalKind, StructuralError> {
        if self.by_name.contains_key(name) {
            return Err(StructuralError::DuplicateTerminal {
                name: name.to_string(),
            });
        }
        let Ok(index) = u8::try_from(self.names.len()) else {
            return Err(StructuralError::TooManyTerminals {
                max: TerminalKind::MAX,
            });
        };
        if usize::from(index) >= TerminalKind::MAX {
            return Err(StructuralError::TooManyTerminals {
                max: TerminalKind::MAX,
            });
        }
        let kind = TerminalKind::from_index(index);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), kind);
        Ok(kind)
    }

    /// Look up a kind by name.
    pub fn get(&self, name: &str) -> Option<TerminalKind> {
        self.by_name.get(name).copied()
    }

    /// Name of a registered kind, or `"<unknown>"` for a foreign kind.
    pub fn name(&self, kind: TerminalKind) -> &str {
        self.names
            .get(usize::from(kind.index()))
            .map_or("<unknown>", String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = TerminalKind> + '_ {
        (0..self.names.len()).filter_map(|i| u8::try_from(i).ok().map(TerminalKind::from_index))
    }
}
