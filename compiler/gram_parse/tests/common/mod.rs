//! Shared test utilities: the element-declaration grammar.
//!
//! ```text
//! statement            := withEqualsStatement | withDefaultStatement
//! withEqualsStatement  := Element Ident Colon qualifiedName Equals Number SemiColon
//! withDefaultStatement := Element Ident Colon qualifiedName Default Number SemiColon
//! qualifiedName        := Ident (Dot Ident)*
//! ```
//!
//! The two statement forms share a prefix of unbounded length, so choosing
//! between them takes a speculative trial. `qualifiedName` never resyncs.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use gram_analysis::GrammarDefinition;
use gram_ir::{Expr, GrammarBuilder, RuleOptions, StructuralError, TerminalKind};
use gram_parse::{GatedAlternative, ParseError, Parser, RuleHandle, Token};

pub const NUMBER: TerminalKind = TerminalKind::from_index(0);
pub const ELEMENT: TerminalKind = TerminalKind::from_index(1);
pub const DEFAULT: TerminalKind = TerminalKind::from_index(2);
pub const DOT: TerminalKind = TerminalKind::from_index(3);
pub const COLON: TerminalKind = TerminalKind::from_index(4);
pub const EQUALS: TerminalKind = TerminalKind::from_index(5);
pub const SEMI_COLON: TerminalKind = TerminalKind::from_index(6);
pub const IDENT: TerminalKind = TerminalKind::from_index(7);

pub const TERMINAL_NAMES: [&str; 8] = [
    "Number",
    "Element",
    "Default",
    "Dot",
    "Colon",
    "Equals",
    "SemiColon",
    "Ident",
];

pub struct ElementGrammar;

impl GrammarDefinition for ElementGrammar {
    const NAME: &'static str = "element";

    fn define(b: &mut GrammarBuilder) -> Result<(), StructuralError> {
        for name in TERMINAL_NAMES {
            b.terminal(name)?;
        }
        b.rule(
            "statement",
            Expr::or([
                Expr::subrule("withEqualsStatement"),
                Expr::subrule("withDefaultStatement"),
            ]),
        )?;
        b.rule("withEqualsStatement", statement_body(EQUALS))?;
        b.rule("withDefaultStatement", statement_body(DEFAULT))?;
        b.rule_with(
            "qualifiedName",
            Expr::seq([
                Expr::consume(IDENT),
                Expr::many(Expr::seq([Expr::consume(DOT), Expr::consume_n(IDENT, 2)])),
            ]),
            RuleOptions::without_resync(),
        )?;
        Ok(())
    }
}

fn statement_body(assignment: TerminalKind) -> Expr {
    Expr::seq([
        Expr::consume(ELEMENT),
        Expr::consume(IDENT),
        Expr::consume(COLON),
        Expr::subrule("qualifiedName"),
        Expr::consume(assignment),
        Expr::consume(NUMBER),
        Expr::consume(SEMI_COLON),
    ])
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RetType {
    WithEquals,
    WithDefault,
    QualifiedName,
    InvalidStatement,
    InvalidWithEquals,
    InvalidWithDefault,
    InvalidQualifiedName,
}

pub const STATEMENT: RuleHandle<RetType> =
    RuleHandle::new("statement", statement, || RetType::InvalidStatement);
pub const WITH_EQUALS: RuleHandle<RetType> = RuleHandle::new(
    "withEqualsStatement",
    with_equals_statement,
    || RetType::InvalidWithEquals,
);
pub const WITH_DEFAULT: RuleHandle<RetType> = RuleHandle::new(
    "withDefaultStatement",
    with_default_statement,
    || RetType::InvalidWithDefault,
);
pub const QUALIFIED_NAME: RuleHandle<RetType> =
    RuleHandle::new("qualifiedName", qualified_name, || RetType::InvalidQualifiedName);

fn statement(p: &mut Parser<'_>) -> Result<RetType, ParseError> {
    p.or_gated(&[
        GatedAlternative::new(WITH_EQUALS, |r| *r == RetType::WithEquals),
        GatedAlternative::new(WITH_DEFAULT, |r| *r == RetType::WithDefault),
    ])
}

fn with_equals_statement(p: &mut Parser<'_>) -> Result<RetType, ParseError> {
    declaration(p, EQUALS)?;
    Ok(RetType::WithEquals)
}

fn with_default_statement(p: &mut Parser<'_>) -> Result<RetType, ParseError> {
    declaration(p, DEFAULT)?;
    Ok(RetType::WithDefault)
}

fn declaration(p: &mut Parser<'_>, assignment: TerminalKind) -> Result<(), ParseError> {
    p.consume(ELEMENT)?;
    p.consume(IDENT)?;
    p.consume(COLON)?;
    p.subrule(QUALIFIED_NAME)?;
    p.consume(assignment)?;
    p.consume(NUMBER)?;
    p.consume(SEMI_COLON)?;
    Ok(())
}

fn qualified_name(p: &mut Parser<'_>) -> Result<RetType, ParseError> {
    p.consume(IDENT)?;
    while p.check(DOT) {
        p.consume(DOT)?;
        p.consume_n(IDENT, 2)?;
    }
    Ok(RetType::QualifiedName)
}

/// Tokenize a space-separated source.
///
/// Every test lexes first, so this is also where `RUST_LOG` output gets
/// switched on.
pub fn lex(source: &str) -> Vec<Token> {
    gram_analysis::init_tracing();
    let mut offset = 0;
    source
        .split_whitespace()
        .map(|text| {
            let kind = match text {
                "elem" => ELEMENT,
                "default" => DEFAULT,
                "." => DOT,
                ":" => COLON,
                "=" => EQUALS,
                ";" => SEMI_COLON,
                _ if text.bytes().all(|b| b.is_ascii_digit()) => NUMBER,
                _ => IDENT,
            };
            let token = Token::new(kind, text, offset);
            offset += text.len() + 1;
            token
        })
        .collect()
}

/// A token of `kind` with a representative text.
pub fn token_of(kind: TerminalKind, offset: usize) -> Token {
    let text = match kind {
        NUMBER => "5",
        ELEMENT => "elem",
        DEFAULT => "default",
        DOT => ".",
        COLON => ":",
        EQUALS => "=",
        SEMI_COLON => ";",
        _ => "x",
    };
    Token::new(kind, text, offset)
}
