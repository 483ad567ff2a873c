use draughts::{find_move_tokens, format_move, is_move_token, parse_move, Move, Square};
use proptest::prelude::*;

fn square() -> impl Strategy<Value = Square> {
    (1u8..=32).prop_map(|n| Square::new(n).unwrap())
}

fn any_move() -> impl Strategy<Value = Move> {
    prop_oneof![
        (square(), square())
            .prop_filter_map("degenerate step", |(from, to)| Move::step(from, to).ok()),
        (square(), prop::collection::vec(square(), 0..5), square()).prop_filter_map(
            "degenerate jump",
            |(from, hops, to)| Move::jump(from, &hops, to).ok()
        ),
    ]
}

proptest! {
    #[test]
    fn parse_inverts_format(mv in any_move()) {
        let token = format_move(&mv);
        prop_assert_eq!(parse_move(&token).unwrap(), mv);
    }

    #[test]
    fn format_inverts_parse(mv in any_move()) {
        let token = format_move(&mv);
        prop_assert!(is_move_token(&token));
        prop_assert_eq!(format_move(&parse_move(&token).unwrap()), token);
    }

    #[test]
    fn scanner_finds_embedded_token(
        mv in any_move(),
        prefix in "[a-z ]{0,8}",
        suffix in "[ .!]{0,3}",
    ) {
        let token = format_move(&mv);
        let text = format!("{} {}{}", prefix, token, suffix);
        let found = find_move_tokens(&text);
        prop_assert_eq!(found, vec![mv]);
    }

    #[test]
    fn parse_never_panics(text in "\\PC{0,16}") {
        let _ = parse_move(&text);
        let _ = find_move_tokens(&text);
    }
}

#[test]
fn double_jump_round_trips() {
    let mv = parse_move("12x19x26").unwrap();
    assert_eq!(mv.from().index(), 12);
    assert_eq!(mv.to().index(), 26);
    assert_eq!(mv.captures().iter().map(|s| s.index()).collect::<Vec<_>>(), vec![19]);
    assert_eq!(format_move(&mv), "12x19x26");
}
