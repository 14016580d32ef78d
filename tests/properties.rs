//! Property-based tests for the reader, printer and evaluator.
//!
//! Generated value trees check that:
//! 1. Round trip: read(print(v)) is structurally equal to v
//! 2. Quote idempotence: (quote v) evaluates to v, nested lists included
//! 3. Truthiness: only #f selects the alternative of an `if`
//! 4. `+` and `*` fold over any number of arguments

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use proptest::prelude::*;
use seqlisp::ast::{Value, list, sym};
use seqlisp::{GlobalEnv, create_global_env, eval, eval_str, read};

/// Atom tokens that must read back as symbols: no whitespace, no parens,
/// no leading `#`, and not parseable as an integer.
fn symbol_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z+*?!<>=_-][a-z0-9+*?!<>=_-]{0,8}")
        .unwrap()
        .prop_filter("not an integer", |s| s.parse::<i64>().is_err())
}

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Number),
        any::<bool>().prop_map(Value::Boolean),
        symbol_strategy().prop_map(Value::Symbol),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(list)
    })
}

fn env() -> GlobalEnv {
    create_global_env()
}

proptest! {
    #[test]
    fn read_print_round_trip(value in value_strategy()) {
        let printed = value.to_string();
        let reread = read(&printed).unwrap();
        prop_assert!(reread.equal(&value).unwrap(), "{} re-read as {}", printed, reread);
    }

    #[test]
    fn quote_returns_its_operand(value in value_strategy()) {
        let form = list([sym("quote"), value.clone()]);
        let result = eval(&env(), &form).unwrap();
        prop_assert!(result.equal(&value).unwrap());

        let from_text = eval_str(&env(), &format!("(quote {value})")).unwrap();
        prop_assert!(from_text.equal(&value).unwrap());
    }

    #[test]
    fn only_false_is_falsy(value in value_strategy()) {
        let result = eval_str(&env(), &format!("(if (quote {value}) 1 2)")).unwrap();
        let expected = if matches!(value, Value::Boolean(false)) { 2 } else { 1 };
        prop_assert!(matches!(result, Value::Number(n) if n == expected));
    }

    #[test]
    fn builtins_fold_their_arguments(nums in prop::collection::vec(any::<i64>(), 0..16)) {
        let args: Vec<String> = nums.iter().map(ToString::to_string).collect();
        let args = args.join(" ");

        let sum = nums.iter().fold(0i64, |acc, n| acc.wrapping_add(*n));
        let product = nums.iter().fold(1i64, |acc, n| acc.wrapping_mul(*n));

        let added = eval_str(&env(), &format!("(+ {args})")).unwrap();
        let multiplied = eval_str(&env(), &format!("(* {args})")).unwrap();
        prop_assert!(matches!(added, Value::Number(n) if n == sum));
        prop_assert!(matches!(multiplied, Value::Number(n) if n == product));
    }
}
