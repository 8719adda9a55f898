//! Token cursor for navigating the token stream.
//!
//! The stream has no end-of-input token; running off the end is reported
//! as `None` by the accessors.

use crate::Token;
use gram_ir::TerminalKind;
use tracing::trace;

/// Cursor over a token slice.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Index of the next token to be consumed.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the cursor position directly.
    ///
    /// Used when restoring a [`ParserSnapshot`](crate::ParserSnapshot).
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(
            pos <= self.tokens.len(),
            "cursor position {} out of bounds (max {})",
            pos,
            self.tokens.len()
        );
        self.pos = pos.min(self.tokens.len());
    }

    #[inline]
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn current_kind(&self) -> Option<TerminalKind> {
        self.current().map(|token| token.kind)
    }

    /// Kind of the token `n` places after the current one.
    #[inline]
    pub fn peek_kind_at(&self, n: usize) -> Option<TerminalKind> {
        self.tokens.get(self.pos + n).map(|token| token.kind)
    }

    /// Byte offset of the current token, or of the end of the last token.
    pub fn current_offset(&self) -> usize {
        match self.current() {
            Some(token) => token.offset,
            None => self
                .tokens
                .last()
                .map_or(0, |token| token.offset + token.text.len()),
        }
    }

    #[inline]
    pub fn check(&self, kind: TerminalKind) -> bool {
        self.current_kind() == Some(kind)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consume the current token. Returns `None` at the end of input.
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        trace!(pos = self.pos, offset = token.offset, text = %token.text, "advance");
        self.pos += 1;
        Some(token)
    }
}
