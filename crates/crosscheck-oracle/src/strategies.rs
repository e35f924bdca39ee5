//! Proptest strategies for scalar values.
//!
//! Harness command generators usually need a stream of plausible argument
//! values; these strategies produce them, weighted toward the small
//! magnitudes and edge cases that shake out off-by-one behavior.

use crate::scalar::Scalar;
use proptest::prelude::*;

/// Strategy for small signed integers, weighted toward boundaries.
pub fn int_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        3 => (-10i64..=10).prop_map(Scalar::Int),
        1 => Just(Scalar::Int(0)),
        1 => Just(Scalar::Int(i64::MAX)),
        1 => Just(Scalar::Int(i64::MIN)),
        2 => any::<i64>().prop_map(Scalar::Int),
    ]
}

/// Strategy for booleans.
pub fn bool_strategy() -> impl Strategy<Value = Scalar> {
    any::<bool>().prop_map(Scalar::Bool)
}

/// Strategy for characters, including ones that need escaping.
pub fn char_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        4 => proptest::char::range('a', 'z').prop_map(Scalar::Char),
        1 => Just(Scalar::Char('\'')),
        1 => Just(Scalar::Char('\\')),
        1 => Just(Scalar::Char('\n')),
        1 => any::<char>().prop_map(Scalar::Char),
    ]
}

/// Strategy for short strings, including ones that need escaping.
pub fn text_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        3 => "[a-z]{0,8}".prop_map(|s| Scalar::Text(s)),
        1 => Just(Scalar::Text(String::new())),
        1 => Just(Scalar::Text("line\nbreak".to_string())),
        1 => Just(Scalar::Text("quote\"inside".to_string())),
    ]
}

/// Strategy for any flat (non-nested) scalar.
pub fn flat_scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Unit),
        bool_strategy(),
        int_strategy(),
        char_strategy(),
        text_strategy(),
    ]
}

/// Strategy for scalars, with shallow lists and optionals on top of the
/// flat values.
pub fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    flat_scalar_strategy().prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Scalar::List),
            prop::option::of(inner).prop_map(|o| Scalar::Opt(o.map(Box::new))),
        ]
    })
}

/// Strategy for a fixed-length list of integers.
pub fn int_list_strategy(len: usize) -> impl Strategy<Value = Scalar> {
    prop::collection::vec(-100i64..=100, len)
        .prop_map(|v| Scalar::List(v.into_iter().map(Scalar::Int).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_int_strategy_generates_values() {
        let mut runner = TestRunner::default();
        for _ in 0..50 {
            let s = int_strategy()
                .new_tree(&mut runner)
                .expect("generation failed")
                .current();
            assert!(matches!(s, Scalar::Int(_)));
        }
    }

    #[test]
    fn test_int_list_strategy_respects_length() {
        let mut runner = TestRunner::default();
        let s = int_list_strategy(5)
            .new_tree(&mut runner)
            .expect("generation failed")
            .current();
        match s {
            Scalar::List(items) => assert_eq!(items.len(), 5),
            other => panic!("expected a list, got {other:?}"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_every_scalar_renders_nonempty(s in scalar_strategy()) {
            prop_assert!(!s.literal().is_empty());
        }

        #[test]
        fn prop_int_literal_round_trips(s in int_strategy()) {
            if let Scalar::Int(i) = &s {
                prop_assert_eq!(s.literal().parse::<i64>().expect("parseable"), *i);
            }
        }

        #[test]
        fn prop_text_literal_is_quoted(s in text_strategy()) {
            let lit = s.literal();
            prop_assert!(lit.starts_with('"') && lit.ends_with('"'));
        }

        #[test]
        fn prop_char_literal_is_quoted(s in char_strategy()) {
            let lit = s.literal();
            prop_assert!(lit.starts_with('\'') && lit.ends_with('\''));
        }

        #[test]
        fn prop_equal_scalars_render_identically(s in scalar_strategy()) {
            let twin = s.clone();
            prop_assert_eq!(s.literal(), twin.literal());
        }
    }
}
