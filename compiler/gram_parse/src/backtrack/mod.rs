//! Backtracking: speculative rule invocation.
//!
//! A speculative attempt runs a rule from the current position as a trial,
//! then always rolls the parser back to where it started. The trial's
//! result goes to a predicate; if the predicate accepts it, the attempt
//! commits and the rule is invoked again *for real* from the same start
//! position, so everything it does happens on the committed path.
//!
//! ```text
//! Idle -> Speculating -> Committed  (trial accepted, rule re-invoked)
//!                     -> RolledBack (trial rejected or failed)
//! ```
//!
//! A recognition error inside the trial is a rejection, not an error of the
//! caller. Structural errors always propagate. While any trial is running,
//! recovery is off: a trial must fail rather than repair its input.
//!
//! Attempts nest. Every level restores its own snapshot before returning.

use crate::{ParseError, Parser, RuleHandle};
use gram_ir::TerminalSet;
use tracing::debug;

/// Why a speculative attempt rolled back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The trial succeeded but the predicate refused its result.
    PredicateFalse,
    /// The trial hit a recognition error.
    Failed(ParseError),
}

/// Outcome of a speculative attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Speculation<T> {
    /// The value of the real, committed invocation.
    Committed(T),
    RolledBack(Rejection),
}

impl<T> Speculation<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Speculation::Committed(_))
    }

    pub fn committed(self) -> Option<T> {
        match self {
            Speculation::Committed(value) => Some(value),
            Speculation::RolledBack(_) => None,
        }
    }
}

/// One alternative of [`Parser::or_gated`].
pub struct GatedAlternative<T> {
    rule: RuleHandle<T>,
    occurrence: u32,
    gate: Option<fn(&T) -> bool>,
}

impl<T> GatedAlternative<T> {
    /// An alternative taken when a trial run of `rule` satisfies `accept`.
    pub const fn new(rule: RuleHandle<T>, accept: fn(&T) -> bool) -> Self {
        GatedAlternative {
            rule,
            occurrence: 1,
            gate: Some(accept),
        }
    }

    /// An alternative taken unconditionally once reached.
    pub const fn ungated(rule: RuleHandle<T>) -> Self {
        GatedAlternative {
            rule,
            occurrence: 1,
            gate: None,
        }
    }

    /// Which reference to `rule` in the enclosing rule this alternative is.
    #[must_use]
    pub const fn with_occurrence(mut self, occurrence: u32) -> Self {
        self.occurrence = occurrence;
        self
    }
}

impl<T> Clone for GatedAlternative<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for GatedAlternative<T> {}

impl Parser<'_> {
    /// Trial run of `rule`. Always restores.
    ///
    /// Returns `None` if the trial succeeded and `accept` took its result.
    fn trial<T>(
        &mut self,
        rule: RuleHandle<T>,
        accept: impl FnOnce(&T) -> bool,
    ) -> Result<Option<Rejection>, ParseError> {
        let snapshot = self.snapshot();
        self.speculation_depth += 1;
        debug!(
            rule = rule.name(),
            position = snapshot.position(),
            depth = self.speculation_depth,
            "speculation entered"
        );
        let outcome = self.invoke(rule);
        self.speculation_depth -= 1;
        let end = self.position();
        self.restore(snapshot);

        let rejection = match outcome {
            Ok(value) => (!accept(&value)).then_some(Rejection::PredicateFalse),
            Err(error) if error.is_recognition() => Some(Rejection::Failed(error)),
            Err(error) => return Err(error),
        };
        match &rejection {
            None => debug!(rule = rule.name(), trial_end = end, "speculation accepted"),
            Some(reason) => debug!(rule = rule.name(), ?reason, "speculation rolled back"),
        }
        Ok(rejection)
    }

    /// Gate: does a trial run of `rule` from here satisfy `accept`?
    ///
    /// The parser is left exactly where it was, whatever the answer.
    pub fn backtrack<T>(
        &mut self,
        rule: RuleHandle<T>,
        accept: impl FnOnce(&T) -> bool,
    ) -> Result<bool, ParseError> {
        Ok(self.trial(rule, accept)?.is_none())
    }

    /// Speculatively invoke the first reference to `rule`; on acceptance,
    /// re-invoke it for real.
    pub fn try_speculate<T>(
        &mut self,
        rule: RuleHandle<T>,
        accept: impl FnOnce(&T) -> bool,
    ) -> Result<Speculation<T>, ParseError> {
        self.try_speculate_n(rule, 1, accept)
    }

    pub fn try_speculate_n<T>(
        &mut self,
        rule: RuleHandle<T>,
        occurrence: u32,
        accept: impl FnOnce(&T) -> bool,
    ) -> Result<Speculation<T>, ParseError> {
        if let Some(rejection) = self.trial(rule, accept)? {
            return Ok(Speculation::RolledBack(rejection));
        }
        let value = self.subrule_n(rule, occurrence)?;
        debug!(rule = rule.name(), position = self.position(), "speculation committed");
        Ok(Speculation::Committed(value))
    }

    /// [`try_speculate`](Self::try_speculate) without the rejection reason.
    pub fn speculate<T>(
        &mut self,
        rule: RuleHandle<T>,
        accept: impl FnOnce(&T) -> bool,
    ) -> Result<Option<T>, ParseError> {
        Ok(self.try_speculate(rule, accept)?.committed())
    }

    /// Try `alternatives` in declaration order; the first whose gate accepts
    /// is committed and no later one is tried.
    ///
    /// Fails with [`ParseError::NoViableAlternative`] at the starting
    /// position when every gate rejects.
    pub fn or_gated<T>(&mut self, alternatives: &[GatedAlternative<T>]) -> Result<T, ParseError> {
        let start = self.position();
        for alt in alternatives {
            let Some(gate) = alt.gate else {
                return self.subrule_n(alt.rule, alt.occurrence);
            };
            if let Speculation::Committed(value) =
                self.try_speculate_n(alt.rule, alt.occurrence, gate)?
            {
                return Ok(value);
            }
        }
        Err(self.no_viable_alternative(alternatives, start))
    }

    fn no_viable_alternative<T>(
        &self,
        alternatives: &[GatedAlternative<T>],
        position: usize,
    ) -> ParseError {
        let mut expected = TerminalSet::new();
        for alt in alternatives {
            match self.resolve(alt.rule.name()) {
                Ok(id) => expected.union_with(&self.analysis().first_of_rule(id)),
                Err(error) => return error,
            }
        }
        let grammar = self.grammar();
        ParseError::NoViableAlternative {
            rule: self
                .current_rule()
                .map_or_else(|| "<top>".to_string(), |id| grammar.rule_name(id).to_string()),
            position,
            expected: expected.format_expected(grammar.terminals()),
        }
    }
}
