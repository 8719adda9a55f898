#![allow(clippy::unwrap_used)]

use super::*;
use crate::{Expr, RepetitionKind, RuleOptions, StructuralError};
use pretty_assertions::assert_eq;

struct Kinds {
    ident: TerminalKind,
    dot: TerminalKind,
    comma: TerminalKind,
}

fn builder() -> (GrammarBuilder, Kinds) {
    let mut b = GrammarBuilder::new("test");
    let kinds = Kinds {
        ident: b.terminal("Ident").unwrap(),
        dot: b.terminal("Dot").unwrap(),
        comma: b.terminal("Comma").unwrap(),
    };
    (b, kinds)
}

#[test]
fn test_occurrences_assigned_in_declaration_order() {
    let (mut b, k) = builder();
    b.rule("name", Expr::consume(k.ident)).unwrap();
    let pair = b
        .rule(
            "pair",
            Expr::seq([
                Expr::subrule("name"),
                Expr::consume(k.comma),
                Expr::subrule("name"),
                Expr::many(Expr::seq([Expr::consume(k.comma), Expr::subrule("name")])),
            ]),
        )
        .unwrap();
    let g = b.build().unwrap();
    let name = g.rule_by_name("name").unwrap();

    assert_eq!(g.references_in(pair), vec![(name, 1), (name, 2), (name, 3)]);
    assert_eq!(g.terminals_in(pair), vec![(k.comma, 1), (k.comma, 2)]);
}

#[test]
fn test_occurrences_are_per_enclosing_rule() {
    let (mut b, k) = builder();
    b.rule("leaf", Expr::consume(k.ident)).unwrap();
    let a = b.rule("a", Expr::subrule("leaf")).unwrap();
    let c = b.rule("c", Expr::subrule("leaf")).unwrap();
    let g = b.build().unwrap();
    let leaf = g.rule_by_name("leaf").unwrap();

    assert_eq!(g.references_in(a), vec![(leaf, 1)]);
    assert_eq!(g.references_in(c), vec![(leaf, 1)]);
}

#[test]
fn test_pinned_occurrence_then_auto() {
    let (mut b, k) = builder();
    b.rule("leaf", Expr::consume(k.ident)).unwrap();
    let r = b
        .rule(
            "r",
            Expr::seq([Expr::subrule_n("leaf", 3), Expr::subrule("leaf")]),
        )
        .unwrap();
    let g = b.build().unwrap();
    let leaf = g.rule_by_name("leaf").unwrap();
    assert_eq!(g.references_in(r), vec![(leaf, 3), (leaf, 4)]);
}

#[test]
fn test_duplicate_occurrence_rejected() {
    let (mut b, k) = builder();
    b.rule("leaf", Expr::consume(k.ident)).unwrap();
    let err = b
        .rule(
            "r",
            Expr::seq([Expr::subrule("leaf"), Expr::subrule_n("leaf", 1)]),
        )
        .unwrap_err();
    assert_eq!(
        err,
        StructuralError::DuplicateOccurrence {
            enclosing: "r".to_string(),
            target: "leaf".to_string(),
            occurrence: 1,
        }
    );
}

#[test]
fn test_zero_occurrence_rejected() {
    let (mut b, k) = builder();
    let err = b.rule("r", Expr::consume_n(k.dot, 0)).unwrap_err();
    assert!(matches!(err, StructuralError::ZeroOccurrence { .. }));
}

#[test]
fn test_forward_and_recursive_references() {
    let (mut b, k) = builder();
    // list := item (Comma list)?   item := Ident | list
    let list = b
        .rule(
            "list",
            Expr::seq([
                Expr::subrule("item"),
                Expr::option(Expr::seq([Expr::consume(k.comma), Expr::subrule("list")])),
            ]),
        )
        .unwrap();
    assert!(!b.is_declared("item"));
    assert_eq!(b.missing_rules(), vec!["item".to_string()]);

    b.rule(
        "item",
        Expr::or([Expr::consume(k.ident), Expr::subrule("list")]),
    )
    .unwrap();
    let g = b.build().unwrap();

    assert_eq!(g.rule_count(), 2);
    assert_eq!(g.rule_by_name("list"), Some(list));
    let item = g.rule_by_name("item").unwrap();
    assert_eq!(g.references_in(list), vec![(item, 1), (list, 1)]);
}

#[test]
fn test_build_before_all_rules_declared() {
    let (mut b, _) = builder();
    b.rule("a", Expr::seq([Expr::subrule("zeta"), Expr::subrule("beta")]))
        .unwrap();
    let err = b.build().unwrap_err();
    assert_eq!(
        err,
        StructuralError::PrematureAnalysis {
            grammar: "test".to_string(),
            missing: vec!["beta".to_string(), "zeta".to_string()],
        }
    );
    assert_eq!(
        err.to_string(),
        "grammar `test` analyzed before these rules were declared: beta, zeta"
    );
}

#[test]
fn test_duplicate_rule_rejected() {
    let (mut b, k) = builder();
    b.rule("a", Expr::consume(k.ident)).unwrap();
    let err = b.rule("a", Expr::consume(k.dot)).unwrap_err();
    assert!(matches!(err, StructuralError::DuplicateRule { ref name, .. } if name == "a"));
}

#[test]
fn test_duplicate_terminal_rejected() {
    let (mut b, _) = builder();
    assert!(matches!(
        b.terminal("Ident"),
        Err(StructuralError::DuplicateTerminal { .. })
    ));
}

#[test]
fn test_separator_lowered_as_terminal() {
    let (mut b, k) = builder();
    let r = b
        .rule("args", Expr::many_sep(Expr::consume(k.ident), k.comma))
        .unwrap();
    let g = b.build().unwrap();

    let Production::Repetition {
        kind,
        body,
        separator: Some(sep),
    } = g.node(g.rule(r).body)
    else {
        panic!("expected a separated repetition");
    };
    assert_eq!(*kind, RepetitionKind::ZeroOrMore);
    assert_eq!(
        *g.node(*body),
        Production::Terminal {
            kind: k.ident,
            occurrence: 1
        }
    );
    assert_eq!(
        *g.node(*sep),
        Production::Terminal {
            kind: k.comma,
            occurrence: 1
        }
    );
}

#[test]
fn test_rule_options() {
    let (mut b, k) = builder();
    let quiet = b
        .rule_with("quiet", Expr::consume(k.ident), RuleOptions::without_resync())
        .unwrap();
    let loud = b.rule("loud", Expr::consume(k.ident)).unwrap();
    let g = b.build().unwrap();
    assert!(!g.rule(quiet).resync_enabled);
    assert!(g.rule(loud).resync_enabled);
}
