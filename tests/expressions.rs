//! Expression construction and re-evaluation tests.

use symexpr_rs::arena::ExprArena;
use symexpr_rs::dot::to_dot;
use symexpr_rs::error::Error;
use symexpr_rs::eval::{Assignment, Evaluator};
use symexpr_rs::operator::Operator;
use symexpr_rs::types::{Domain, Value};

use test_log::test;

// ─── Construction ──────────────────────────────────────────────────────────────

#[test]
fn cached_values_and_sizes() {
    let mut arena = ExprArena::new();
    let x = arena.mk_var("x", 6).unwrap();
    let y = arena.mk_var("y", 7).unwrap();
    let prod = arena.mk_binary(Operator::Mul, x, y).unwrap();
    let two = arena.mk_int(2);
    let e = arena.mk_binary(Operator::Rem, prod, two).unwrap();

    assert_eq!(arena.value(prod), &Value::Integer(42));
    assert_eq!(arena.value(e), &Value::Integer(0));
    assert_eq!(arena.size(e), 5);
    assert!(arena.contains_symbolic(e));
    assert!(!arena.contains_symbolic(two));
    assert_eq!(arena.parent(prod), Some(e));
    assert_eq!(arena.parent(x), Some(prod));
    assert_eq!(arena.parent(e), None);
}

#[test]
fn shared_children_are_counted_per_reference() {
    let mut arena = ExprArena::new();
    let x = arena.mk_var("x", 3).unwrap();
    let sq = arena.mk_binary(Operator::Mul, x, x).unwrap();
    let e = arena.mk_binary(Operator::Plus, sq, sq).unwrap();
    assert_eq!(arena.size(e), 7);
    assert_eq!(arena.value(e), &Value::Integer(18));
}

#[test]
fn variables_are_interned_by_name() {
    let mut arena = ExprArena::new();
    let a = arena.mk_var("s", "abc").unwrap();
    let b = arena.mk_var("s", "abc").unwrap();
    assert_eq!(a, b);
    assert!(matches!(arena.mk_var("s", 1), Err(Error::DomainMismatch { .. })));
    assert!(matches!(arena.mk_var("s", "xyz"), Err(Error::ConflictingVariable { .. })));
}

#[test]
fn construction_validates_domains() {
    let mut arena = ExprArena::new();
    let s = arena.mk_str("abc");
    let r = arena.mk_real(1.0);
    let i = arena.mk_int(1);
    assert!(matches!(arena.mk_binary(Operator::Plus, s, i), Err(Error::DomainMismatch { .. })));
    assert!(matches!(arena.mk_binary(Operator::Plus, r, i), Err(Error::DomainMismatch { .. })));
    assert!(matches!(arena.mk_unary(Operator::Equals, s), Err(Error::ArityMismatch { .. })));
    assert!(arena.mk_cast(s, Domain::Real).is_err());
}

#[test]
fn construction_rejects_impossible_operations() {
    let mut arena = ExprArena::new();
    let one = arena.mk_int(1);
    let zero = arena.mk_int(0);
    assert_eq!(arena.mk_binary(Operator::Div, one, zero), Err(Error::DivisionByZero));

    let s = arena.mk_str("abc");
    let five = arena.mk_int(5);
    assert!(matches!(
        arena.mk_binary(Operator::CharAt, s, five),
        Err(Error::IndexOutOfBounds { index: 5, length: 3 })
    ));
}

#[test]
fn variables_and_constants() {
    let mut arena = ExprArena::new();
    let x = arena.mk_var("x", 1).unwrap();
    let y = arena.mk_var("y", 2).unwrap();
    let three = arena.mk_int(3);
    let a = arena.mk_binary(Operator::Plus, x, three).unwrap();
    let b = arena.mk_binary(Operator::Mul, a, y).unwrap();
    let c = arena.mk_binary(Operator::Minus, b, three).unwrap();

    let vars: Vec<&str> = arena.variables(c).into_iter().map(|v| arena.var_name(v)).collect();
    assert_eq!(vars, vec!["x", "y"]);
    let constants = arena.constants(c);
    assert_eq!(constants.len(), 1);
    assert!(constants.contains(&Value::Integer(3)));
    assert!(arena.variables(three).is_empty());
}

#[test]
fn display_renders_infix() {
    let mut arena = ExprArena::new();
    let x = arena.mk_var("x", 3).unwrap();
    let four = arena.mk_int(4);
    let sum = arena.mk_binary(Operator::Plus, x, four).unwrap();
    assert_eq!(arena.display(sum), "(x + 4)");
}

// ─── Evaluation ────────────────────────────────────────────────────────────────

#[test]
fn casts_between_domains() {
    let mut arena = ExprArena::new();
    let s = arena.mk_var("s", "-42").unwrap();
    let n = arena.mk_cast(s, Domain::Integer).unwrap();
    let r = arena.mk_cast(n, Domain::Real).unwrap();
    let back = arena.mk_cast(r, Domain::String).unwrap();
    assert_eq!(arena.value(back), &Value::from("-42.0"));

    let var = arena.get(s).var().unwrap();
    let bad = Assignment::new().with(var, "4x");
    assert_eq!(
        Evaluator::with_assignment(&arena, &bad).evaluate(back),
        Err(Error::NumberFormat { input: "4x".to_string() })
    );
    let good = Assignment::new().with(var, "1e");
    assert!(Evaluator::with_assignment(&arena, &good).evaluate(back).is_err());
}

#[test]
fn string_pipeline_under_assignment() {
    let mut arena = ExprArena::new();
    let s = arena.mk_var("s", "  Mixed Case ").unwrap();
    let trimmed = arena.mk_unary(Operator::Trim, s).unwrap();
    let lower = arena.mk_unary(Operator::ToLowerCase, trimmed).unwrap();
    let prefix = arena.mk_str("mixed");
    let starts = arena.mk_binary(Operator::StartsWith, lower, prefix).unwrap();
    assert_eq!(arena.value(starts), &Value::Integer(1));

    let var = arena.get(s).var().unwrap();
    let assignment = Assignment::new().with(var, "other");
    let evaluator = Evaluator::with_assignment(&arena, &assignment);
    assert_eq!(evaluator.evaluate_int(starts), Ok(0));
    assert_eq!(evaluator.evaluate_str(lower), Ok("other".to_string()));
}

#[test]
fn real_functions() {
    let mut arena = ExprArena::new();
    let r = arena.mk_var("r", 2.0).unwrap();
    let sqrt = arena.mk_unary(Operator::Sqrt, r).unwrap();
    let round = arena.mk_unary(Operator::Round, sqrt).unwrap();
    assert_eq!(arena.value(round), &Value::Integer(1));

    let var = arena.get(r).var().unwrap();
    let assignment = Assignment::new().with(var, -1.0);
    let evaluator = Evaluator::with_assignment(&arena, &assignment);
    assert!(evaluator.evaluate_real(sqrt).unwrap().is_nan());
    assert_eq!(evaluator.evaluate_int(round), Ok(0));
}

#[test]
fn dot_output_covers_all_nodes() {
    let mut arena = ExprArena::new();
    let s = arena.mk_var("s", "a,b").unwrap();
    let d = arena.mk_str(",");
    let t = arena.mk_tokenizer(s, d).unwrap();
    let token = arena.mk_next_token(t).unwrap();
    let dot = to_dot(&arena, &[token]).unwrap();
    for id in arena.descendants(token) {
        assert!(dot.contains(&format!("\n{} [", id.index())), "missing {}", id);
    }
}

// ─── Arrays ────────────────────────────────────────────────────────────────────

#[test]
fn array_reads_follow_assignments() {
    let mut arena = ExprArena::new();
    let a = arena.mk_var("a", vec![1.5, 2.5]).unwrap();
    let i = arena.mk_var("i", 0).unwrap();
    let x = arena.mk_var("x", 4.0).unwrap();
    let stored = arena.mk_multi(Operator::ArrayStore, a, i, &[x]).unwrap();
    let one = arena.mk_int(1);
    let first = arena.mk_binary(Operator::ArraySelect, stored, i).unwrap();
    let second = arena.mk_binary(Operator::ArraySelect, stored, one).unwrap();
    assert_eq!(arena.value(first), &Value::Real(4.0));
    assert_eq!(arena.value(second), &Value::Real(2.5));

    let var_a = arena.get(a).var().unwrap();
    let var_i = arena.get(i).var().unwrap();
    let assignment = Assignment::new().with(var_a, vec![0.0, -1.0, 8.0]).with(var_i, 2);
    let evaluator = Evaluator::with_assignment(&arena, &assignment);
    assert_eq!(evaluator.evaluate_real(first), Ok(4.0));
    assert_eq!(evaluator.evaluate_real(second), Ok(-1.0));
    assert_eq!(evaluator.evaluate(stored), Ok(Value::from(vec![0.0, -1.0, 4.0])));

    let out_of_bounds = Assignment::new().with(var_i, 2);
    assert_eq!(
        Evaluator::with_assignment(&arena, &out_of_bounds).evaluate(first),
        Err(Error::IndexOutOfBounds { index: 2, length: 2 })
    );
    let wrong_domain = Assignment::new().with(var_a, vec![1i64, 2]);
    assert!(matches!(
        Evaluator::with_assignment(&arena, &wrong_domain).evaluate(first),
        Err(Error::DomainMismatch { .. })
    ));
}

#[test]
fn string_arrays() {
    let mut arena = ExprArena::new();
    let args = arena
        .mk_var("args", vec!["--verbose".to_string(), "in.txt".to_string()])
        .unwrap();
    let zero = arena.mk_int(0);
    let flag = arena.mk_binary(Operator::ArraySelect, args, zero).unwrap();
    let len = arena.mk_unary(Operator::Length, flag).unwrap();
    assert_eq!(arena.domain(args), Domain::StringArray);
    assert_eq!(arena.value(len), &Value::Integer(9));
    assert_eq!(arena.display(len), "args[0].length()");
}
