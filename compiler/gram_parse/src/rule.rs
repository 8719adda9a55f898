//! Rule handles: the runtime side of a declared rule.

use crate::{ParseError, Parser};
use std::fmt;

/// Body of a rule: consumes tokens and produces a value.
pub type RuleBody<T> = fn(&mut Parser<'_>) -> Result<T, ParseError>;

/// Binds a declared rule, by name, to the function that parses it and to
/// the value returned when the rule is resynced past.
///
/// Handles are plain data and can be declared as constants next to the
/// rule functions:
///
/// ```ignore
/// const QUALIFIED_NAME: RuleHandle<Ret> =
///     RuleHandle::new("qualifiedName", qualified_name, || Ret::InvalidQualifiedName);
/// ```
pub struct RuleHandle<T> {
    name: &'static str,
    body: RuleBody<T>,
    recovery: fn() -> T,
}

impl<T> RuleHandle<T> {
    pub const fn new(name: &'static str, body: RuleBody<T>, recovery: fn() -> T) -> Self {
        RuleHandle {
            name,
            body,
            recovery,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub(crate) fn body(&self) -> RuleBody<T> {
        self.body
    }

    /// Value returned in place of a rule that failed and was resynced.
    #[inline]
    pub fn recovery_value(&self) -> T {
        (self.recovery)()
    }
}

impl<T> Clone for RuleHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RuleHandle<T> {}

impl<T> fmt::Debug for RuleHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleHandle({})", self.name)
    }
}
