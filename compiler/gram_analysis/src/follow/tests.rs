#![allow(clippy::unwrap_used)]

use super::*;
use gram_ir::{Expr, GrammarBuilder, RuleOptions};
use pretty_assertions::assert_eq;

fn set(kinds: &[TerminalKind]) -> TerminalSet {
    kinds.iter().copied().collect()
}

fn follows_of(g: &Grammar) -> FollowTable {
    let mut first = FirstSets::new(g);
    compute_all_rules_follows(&mut first).unwrap()
}

fn rule(g: &Grammar, name: &str) -> RuleId {
    g.rule_by_name(name).unwrap()
}

/// `statement := withEqualsStatement | withDefaultStatement`, where both
/// alternatives share an unbounded `qualifiedName` prefix.
fn element_grammar() -> Grammar {
    let mut b = GrammarBuilder::new("element");
    let number = b.terminal("Number").unwrap();
    let element = b.terminal("Element").unwrap();
    let default = b.terminal("Default").unwrap();
    let dot = b.terminal("Dot").unwrap();
    let colon = b.terminal("Colon").unwrap();
    let equals = b.terminal("Equals").unwrap();
    let semi = b.terminal("SemiColon").unwrap();
    let ident = b.terminal("Ident").unwrap();

    b.rule(
        "statement",
        Expr::or([
            Expr::subrule("withEqualsStatement"),
            Expr::subrule("withDefaultStatement"),
        ]),
    )
    .unwrap();
    for (name, marker) in [
        ("withEqualsStatement", equals),
        ("withDefaultStatement", default),
    ] {
        b.rule(
            name,
            Expr::seq([
                Expr::consume(element),
                Expr::consume(ident),
                Expr::consume(colon),
                Expr::subrule("qualifiedName"),
                Expr::consume(marker),
                Expr::consume(number),
                Expr::consume(semi),
            ]),
        )
        .unwrap();
    }
    b.rule_with(
        "qualifiedName",
        Expr::seq([
            Expr::consume(ident),
            Expr::many(Expr::seq([Expr::consume(dot), Expr::consume_n(ident, 2)])),
        ]),
        RuleOptions::without_resync(),
    )
    .unwrap();
    b.build().unwrap()
}

#[test]
fn test_shared_reference_gets_distinct_keys_per_enclosing_rule() {
    let g = element_grammar();
    let follows = follows_of(&g);
    let t = |name| g.terminals().get(name).unwrap();

    let qn = rule(&g, "qualifiedName");
    let with_equals = FollowKey::new(qn, 1, rule(&g, "withEqualsStatement"));
    let with_default = FollowKey::new(qn, 1, rule(&g, "withDefaultStatement"));

    assert_ne!(with_equals, with_default);
    assert_eq!(follows.get(&with_equals), Some(set(&[t("Equals")])));
    assert_eq!(follows.get(&with_default), Some(set(&[t("Default")])));
    assert_eq!(
        with_equals.display(&g).to_string(),
        "qualifiedName1_~IN~_withEqualsStatement"
    );
}

#[test]
fn test_reference_at_end_of_rule_has_empty_follows() {
    let g = element_grammar();
    let follows = follows_of(&g);
    let statement = rule(&g, "statement");
    let key = FollowKey::new(rule(&g, "withEqualsStatement"), 1, statement);
    assert_eq!(follows.get(&key), Some(TerminalSet::new()));
    // two alternatives, two references, nothing else in the grammar
    assert_eq!(follows.len(), 4);
}

#[test]
fn test_repetition_follows() {
    // e := a (Sep a)* End
    let mut b = GrammarBuilder::new("rep");
    let sep = b.terminal("Sep").unwrap();
    let end = b.terminal("End").unwrap();
    let item = b.terminal("Item").unwrap();
    let e = b
        .rule(
            "e",
            Expr::seq([
                Expr::subrule("a"),
                Expr::many(Expr::seq([Expr::consume(sep), Expr::subrule("a")])),
                Expr::consume(end),
            ]),
        )
        .unwrap();
    let a = b.rule("a", Expr::consume(item)).unwrap();
    let g = b.build().unwrap();
    let follows = follows_of(&g);

    assert_eq!(follows.get(&FollowKey::new(a, 1, e)), Some(set(&[sep, end])));
    assert_eq!(follows.get(&FollowKey::new(a, 2, e)), Some(set(&[sep, end])));
}

#[test]
fn test_one_or_more_body_sees_next_iteration() {
    // r := (X a)+ Y
    let mut b = GrammarBuilder::new("plus");
    let x = b.terminal("X").unwrap();
    let y = b.terminal("Y").unwrap();
    let r = b
        .rule(
            "r",
            Expr::seq([
                Expr::at_least_one(Expr::seq([Expr::consume(x), Expr::subrule("a")])),
                Expr::consume(y),
            ]),
        )
        .unwrap();
    let a = b.rule("a", Expr::consume(y)).unwrap();
    let g = b.build().unwrap();
    assert_eq!(
        follows_of(&g).get(&FollowKey::new(a, 1, r)),
        Some(set(&[x, y]))
    );
}

#[test]
fn test_optional_body_does_not_repeat() {
    // r := (X a)? Y
    let mut b = GrammarBuilder::new("opt");
    let x = b.terminal("X").unwrap();
    let y = b.terminal("Y").unwrap();
    let r = b
        .rule(
            "r",
            Expr::seq([
                Expr::option(Expr::seq([Expr::consume(x), Expr::subrule("a")])),
                Expr::consume(y),
            ]),
        )
        .unwrap();
    let a = b.rule("a", Expr::consume(x)).unwrap();
    let g = b.build().unwrap();
    assert_eq!(follows_of(&g).get(&FollowKey::new(a, 1, r)), Some(set(&[y])));
}

#[test]
fn test_separated_repetition_follows() {
    // args := a (Comma a)* via many_sep, then RParen
    let mut b = GrammarBuilder::new("sep");
    let comma = b.terminal("Comma").unwrap();
    let rparen = b.terminal("RParen").unwrap();
    let ident = b.terminal("Ident").unwrap();
    let args = b
        .rule(
            "args",
            Expr::seq([
                Expr::many_sep(Expr::subrule("a"), comma),
                Expr::consume(rparen),
            ]),
        )
        .unwrap();
    let a = b.rule("a", Expr::consume(ident)).unwrap();
    let g = b.build().unwrap();
    assert_eq!(
        follows_of(&g).get(&FollowKey::new(a, 1, args)),
        Some(set(&[comma, rparen]))
    );
}

#[test]
fn test_alternation_branches_share_outer_rest() {
    // r := (a | X a) (Y)* Z
    let mut b = GrammarBuilder::new("alt");
    let x = b.terminal("X").unwrap();
    let y = b.terminal("Y").unwrap();
    let z = b.terminal("Z").unwrap();
    let r = b
        .rule(
            "r",
            Expr::seq([
                Expr::or([
                    Expr::subrule("a"),
                    Expr::seq([Expr::consume(x), Expr::subrule("a")]),
                ]),
                Expr::many(Expr::consume(y)),
                Expr::consume(z),
            ]),
        )
        .unwrap();
    let a = b.rule("a", Expr::consume(x)).unwrap();
    let g = b.build().unwrap();
    let follows = follows_of(&g);
    assert_eq!(follows.get(&FollowKey::new(a, 1, r)), Some(set(&[y, z])));
    assert_eq!(follows.get(&FollowKey::new(a, 2, r)), Some(set(&[y, z])));
}

#[test]
fn test_follows_stop_at_enclosing_rule() {
    // outer := inner Z ; inner := a
    // Inside `inner`, nothing follows `a`; outer's Z is not part of it.
    let mut b = GrammarBuilder::new("scope");
    let x = b.terminal("X").unwrap();
    let z = b.terminal("Z").unwrap();
    let outer = b
        .rule("outer", Expr::seq([Expr::subrule("inner"), Expr::consume(z)]))
        .unwrap();
    let inner = b.rule("inner", Expr::subrule("a")).unwrap();
    let a = b.rule("a", Expr::consume(x)).unwrap();
    let g = b.build().unwrap();
    let follows = follows_of(&g);

    assert_eq!(follows.get(&FollowKey::new(inner, 1, outer)), Some(set(&[z])));
    assert_eq!(follows.get(&FollowKey::new(a, 1, inner)), Some(TerminalSet::new()));
}

#[test]
fn test_follows_through_nullable_rule() {
    // r := a maybe Z ; maybe := X?
    let mut b = GrammarBuilder::new("nullable");
    let x = b.terminal("X").unwrap();
    let z = b.terminal("Z").unwrap();
    let r = b
        .rule(
            "r",
            Expr::seq([Expr::subrule("a"), Expr::subrule("maybe"), Expr::consume(z)]),
        )
        .unwrap();
    let a = b.rule("a", Expr::consume(z)).unwrap();
    b.rule("maybe", Expr::option(Expr::consume(x))).unwrap();
    let g = b.build().unwrap();
    assert_eq!(follows_of(&g).get(&FollowKey::new(a, 1, r)), Some(set(&[x, z])));
}

#[test]
fn test_in_rule_terminal_follows() {
    let g = element_grammar();
    let mut first = FirstSets::new(&g);
    let follows = compute_in_rule_follows(&mut first).unwrap();
    let t = |name| g.terminals().get(name).unwrap();

    let with_equals = rule(&g, "withEqualsStatement");
    let qn = rule(&g, "qualifiedName");

    // After `Colon` comes the qualified name, which starts with Ident.
    assert_eq!(
        follows.get(&TerminalKey::new(t("Colon"), 1, with_equals)),
        Some(set(&[t("Ident")]))
    );
    // After the first Ident of a qualified name: another `.ident` or the end.
    assert_eq!(
        follows.get(&TerminalKey::new(t("Ident"), 1, qn)),
        Some(set(&[t("Dot")]))
    );
    assert_eq!(
        follows.get(&TerminalKey::new(t("Ident"), 2, qn)),
        Some(set(&[t("Dot")]))
    );
    assert_eq!(
        follows.get(&TerminalKey::new(t("SemiColon"), 1, with_equals)),
        Some(TerminalSet::new())
    );
    assert_eq!(
        TerminalKey::new(t("Ident"), 2, qn).display(&g).to_string(),
        "Ident2_~IN~_qualifiedName"
    );
}

#[test]
fn test_separator_in_rule_follows() {
    let mut b = GrammarBuilder::new("sep");
    let comma = b.terminal("Comma").unwrap();
    let ident = b.terminal("Ident").unwrap();
    let r = b
        .rule("r", Expr::at_least_one_sep(Expr::consume(ident), comma))
        .unwrap();
    let g = b.build().unwrap();
    let mut first = FirstSets::new(&g);
    let follows = compute_in_rule_follows(&mut first).unwrap();

    assert_eq!(
        follows.get(&TerminalKey::new(comma, 1, r)),
        Some(set(&[ident]))
    );
    assert_eq!(
        follows.get(&TerminalKey::new(ident, 1, r)),
        Some(set(&[comma]))
    );
}

#[test]
fn test_merge_rejects_duplicate_keys() {
    let g = element_grammar();
    let key = FollowKey::new(
        rule(&g, "qualifiedName"),
        1,
        rule(&g, "withEqualsStatement"),
    );
    let mut a = FollowTable::new();
    a.insert(key, TerminalSet::new(), &g).unwrap();
    let mut b = FollowTable::new();
    b.insert(key, TerminalSet::new(), &g).unwrap();

    let err = a.merge(b, &g).unwrap_err();
    assert_eq!(
        err,
        StructuralError::DuplicateFollowKey {
            key: "qualifiedName1_~IN~_withEqualsStatement".to_string()
        }
    );
}

#[test]
fn test_lookup_of_unknown_key_is_an_error() {
    let g = element_grammar();
    let follows = follows_of(&g);
    let key = FollowKey::new(
        rule(&g, "qualifiedName"),
        2,
        rule(&g, "withEqualsStatement"),
    );
    assert_eq!(
        follows.lookup(&key, &g),
        Err(StructuralError::MissingFollowKey {
            key: "qualifiedName2_~IN~_withEqualsStatement".to_string()
        })
    );
}

#[test]
fn test_sorted_entries_are_ordered_by_key() {
    let g = element_grammar();
    let sorted = follows_of(&g).sorted();
    let keys: Vec<_> = sorted.iter().map(|(k, _)| *k).collect();
    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(keys, expected);
}
