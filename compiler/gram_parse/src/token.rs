//! Tokens as the runtime sees them.

use gram_ir::TerminalKind;

/// One lexed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TerminalKind,
    pub text: String,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TerminalKind, text: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            offset,
        }
    }

    /// A token conjured by single-token insertion. It has no text.
    pub(crate) fn inserted(kind: TerminalKind, offset: usize) -> Self {
        Token {
            kind,
            text: String::new(),
            offset,
        }
    }
}
