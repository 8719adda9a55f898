//! The invocation runtime.
//!
//! Rule functions drive a [`Parser`] through [`Parser::consume`] and
//! [`Parser::subrule`]. The parser keeps a stack of active rule frames, each
//! recording which occurrence of the rule its parent invoked. That is
//! exactly the key of the rule's resync follow set, so recovery can look up
//! the follow sets of every active rule without any bookkeeping in the rule
//! functions themselves.
//!
//! # Recovery
//!
//! With [`ParserConfig::recovery_enabled`] set and no speculation in
//! progress:
//!
//! - a mismatched terminal is first recovered by single-token deletion (the
//!   next token is the expected one) and then by single-token insertion (the
//!   current token may follow the missing one within the rule);
//! - a failed sub-rule whose `resync_enabled` is set skips ahead to the
//!   first token in the union of the follow sets of all active rules. If
//!   that token follows the failed rule itself, the rule returns its
//!   recovery value; otherwise the error propagates and an enclosing rule
//!   gets its chance.
//!
//! Every recovery records the original error in [`Parser::errors`].

use crate::recovery::{find_resync_point, synchronize_counted};
use crate::{Cursor, ParseError, ParserConfig, ParserSnapshot, RuleHandle, Token};
use gram_analysis::{ensure_analyzed, AnalyzedGrammar, GrammarDefinition};
use gram_ir::{Grammar, RuleId, StructuralError, TerminalKind, TerminalSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// One active rule invocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RuleFrame {
    pub(crate) rule: RuleId,
    /// Occurrence of this rule inside the parent frame's rule, or
    /// [`RuleFrame::ROOT`] for a rule invoked without a parent.
    pub(crate) occurrence: u32,
}

impl RuleFrame {
    /// Occurrence indices start at 1, so 0 marks a root frame.
    const ROOT: u32 = 0;

    fn root(rule: RuleId) -> Self {
        RuleFrame {
            rule,
            occurrence: Self::ROOT,
        }
    }

    fn is_root(self) -> bool {
        self.occurrence == Self::ROOT
    }
}

/// Parser state for one token stream.
pub struct Parser<'a> {
    analysis: Arc<AnalyzedGrammar>,
    pub(crate) cursor: Cursor<'a>,
    config: ParserConfig,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) rule_stack: Vec<RuleFrame>,
    pub(crate) speculation_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(analysis: Arc<AnalyzedGrammar>, tokens: &'a [Token], config: ParserConfig) -> Self {
        Parser {
            analysis,
            cursor: Cursor::new(tokens),
            config,
            errors: Vec::new(),
            rule_stack: Vec::new(),
            speculation_depth: 0,
        }
    }

    /// Create a parser for `G`, analyzing the grammar on first use.
    pub fn for_grammar<G: GrammarDefinition>(
        tokens: &'a [Token],
        config: ParserConfig,
    ) -> Result<Self, StructuralError> {
        Ok(Self::new(ensure_analyzed::<G>()?, tokens, config))
    }

    #[inline]
    pub fn grammar(&self) -> &Grammar {
        self.analysis.grammar()
    }

    #[inline]
    pub fn analysis(&self) -> &Arc<AnalyzedGrammar> {
        &self.analysis
    }

    #[inline]
    pub fn config(&self) -> ParserConfig {
        self.config
    }

    #[inline]
    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    #[inline]
    pub fn current_kind(&self) -> Option<TerminalKind> {
        self.cursor.current_kind()
    }

    #[inline]
    pub fn check(&self, kind: TerminalKind) -> bool {
        self.cursor.check(kind)
    }

    /// Errors recovered from so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Whether a speculative attempt is in progress.
    #[inline]
    pub fn is_speculating(&self) -> bool {
        self.speculation_depth > 0
    }

    #[inline]
    pub fn speculation_depth(&self) -> usize {
        self.speculation_depth
    }

    /// Number of active rule frames.
    #[inline]
    pub fn rule_depth(&self) -> usize {
        self.rule_stack.len()
    }

    /// The innermost active rule.
    pub fn current_rule(&self) -> Option<RuleId> {
        self.rule_stack.last().map(|frame| frame.rule)
    }

    /// Capture the state a speculative attempt may change.
    pub fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot::new(
            self.cursor.position(),
            self.errors.len(),
            self.rule_stack.len(),
        )
    }

    /// Roll back to a snapshot taken on this parser.
    pub fn restore(&mut self, snapshot: ParserSnapshot) {
        self.cursor.set_position(snapshot.cursor_pos);
        self.errors.truncate(snapshot.error_count);
        self.rule_stack.truncate(snapshot.rule_depth);
    }

    /// Recovery applies only outside speculation.
    #[inline]
    fn recovery_active(&self) -> bool {
        self.config.recovery_enabled && !self.is_speculating()
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<RuleId, ParseError> {
        self.grammar().rule_by_name(name).ok_or_else(|| {
            ParseError::Structural(StructuralError::UnknownRule {
                grammar: self.grammar().name().to_string(),
                name: name.to_string(),
            })
        })
    }

    fn record_error(&mut self, error: ParseError) {
        if self.errors.len() < self.config.max_recorded_errors {
            self.errors.push(error);
        } else {
            trace!(%error, "error limit reached, not recording");
        }
    }

    fn mismatch(&self, expected: TerminalKind) -> ParseError {
        let grammar = self.grammar();
        let found = self.cursor.current_kind();
        ParseError::MismatchedToken {
            expected,
            expected_name: grammar.terminal_name(expected).to_string(),
            found,
            found_name: match found {
                Some(kind) => format!("`{}`", grammar.terminal_name(kind)),
                None => "end of input".to_string(),
            },
            position: self.cursor.position(),
        }
    }

    /// Consume the first occurrence of `kind` in the current rule.
    pub fn consume(&mut self, kind: TerminalKind) -> Result<Token, ParseError> {
        self.consume_n(kind, 1)
    }

    /// Consume the `occurrence`-th consumption of `kind` in the current rule.
    ///
    /// The occurrence only matters for single-token insertion, which looks
    /// up what may follow this exact consumption.
    pub fn consume_n(&mut self, kind: TerminalKind, occurrence: u32) -> Result<Token, ParseError> {
        if let Some(token) = self.cursor.current().filter(|token| token.kind == kind) {
            self.cursor.advance();
            return Ok(token.clone());
        }

        let error = self.mismatch(kind);
        if self.recovery_active() {
            if let Some(token) = self.recover_single_token(kind, occurrence, &error)? {
                return Ok(token);
            }
        }
        Err(error)
    }

    fn recover_single_token(
        &mut self,
        kind: TerminalKind,
        occurrence: u32,
        error: &ParseError,
    ) -> Result<Option<Token>, ParseError> {
        // Deletion: one unexpected token sits in front of the expected one.
        if self.cursor.peek_kind_at(1) == Some(kind) {
            self.cursor.advance();
            let token = self.cursor.advance().cloned();
            debug!(
                expected = self.grammar().terminal_name(kind),
                position = self.cursor.position(),
                "recovered by single-token deletion"
            );
            self.record_error(error.clone());
            return Ok(token);
        }

        // Insertion: the current token can follow the missing one.
        let (Some(rule), Some(current)) = (self.current_rule(), self.cursor.current_kind()) else {
            return Ok(None);
        };
        let follows = self.analysis.terminal_follows(kind, occurrence, rule)?;
        if follows.contains(current) {
            debug!(
                inserted = self.grammar().terminal_name(kind),
                position = self.cursor.position(),
                "recovered by single-token insertion"
            );
            self.record_error(error.clone());
            return Ok(Some(Token::inserted(kind, self.cursor.current_offset())));
        }
        Ok(None)
    }

    /// Invoke the first occurrence of `rule` in the current rule.
    pub fn subrule<T>(&mut self, rule: RuleHandle<T>) -> Result<T, ParseError> {
        self.subrule_n(rule, 1)
    }

    /// Invoke the `occurrence`-th reference to `rule` in the current rule.
    pub fn subrule_n<T>(&mut self, rule: RuleHandle<T>, occurrence: u32) -> Result<T, ParseError> {
        let id = self.resolve(rule.name())?;
        self.rule_stack.push(RuleFrame {
            rule: id,
            occurrence,
        });
        let result = match (rule.body())(self) {
            Err(error) if error.is_recognition() && self.recovery_active() => {
                self.resync(rule, error)
            }
            other => other,
        };
        self.rule_stack.pop();
        result
    }

    /// Run `rule` with no enclosing rule. Failures are never resynced here
    /// since there is nothing to resume.
    pub fn invoke<T>(&mut self, rule: RuleHandle<T>) -> Result<T, ParseError> {
        let id = self.resolve(rule.name())?;
        self.rule_stack.push(RuleFrame::root(id));
        let result = (rule.body())(self);
        self.rule_stack.pop();
        result
    }

    /// Resync after `rule`, the innermost frame, failed with `error`.
    fn resync<T>(&mut self, rule: RuleHandle<T>, error: ParseError) -> Result<T, ParseError> {
        let depth = self.rule_stack.len();
        let (Some(&frame), Some(&parent)) = (
            self.rule_stack.last(),
            depth.checked_sub(2).and_then(|i| self.rule_stack.get(i)),
        ) else {
            return Err(error);
        };
        if frame.is_root() || !self.grammar().rule(frame.rule).resync_enabled {
            return Err(error);
        }

        let own = self
            .analysis
            .rule_follows(frame.rule, frame.occurrence, parent.rule)?;
        let recovery = self.resync_set()?;
        let Some((skip, kind)) = find_resync_point(&self.cursor, recovery) else {
            trace!(rule = rule.name(), "no resync point before end of input");
            return Err(error);
        };
        if !own.contains(kind) {
            trace!(
                rule = rule.name(),
                token = self.grammar().terminal_name(kind),
                "resync point belongs to an enclosing rule"
            );
            return Err(error);
        }

        synchronize_counted(&mut self.cursor, TerminalSet::single(kind));
        debug!(
            rule = rule.name(),
            skipped = skip,
            resumed_at = self.grammar().terminal_name(kind),
            "resynced"
        );
        self.record_error(error);
        Ok(rule.recovery_value())
    }

    /// Union of the follow sets of every active non-root frame.
    fn resync_set(&self) -> Result<TerminalSet, ParseError> {
        let mut set = TerminalSet::new();
        for pair in self.rule_stack.windows(2) {
            let [parent, frame] = pair else { continue };
            if frame.is_root() {
                continue;
            }
            let follows = self
                .analysis
                .rule_follows(frame.rule, frame.occurrence, parent.rule)?;
            set.union_with(&follows);
        }
        Ok(set)
    }
}
