//! Recognisers for branch conditions whose plain numeric distance has no useful
//! gradient.
//!
//! `s.indexOf(c) != -1` is either satisfied or off by exactly one; the useful
//! signal is how far the characters of `s` are from `c`. Each recogniser checks
//! the exact shape of a failing constraint and, when it matches, computes a
//! distance from the concrete operands. [`IDIOMS`] lists them in the order they
//! are tried; the first that matches and yields a positive distance wins.

use log::debug;

use crate::arena::ExprArena;
use crate::comparator::Comparator;
use crate::constraint::Constraint;
use crate::eval::Evaluator;
use crate::node::{ExprKind, Node};
use crate::operator::Operator;
use crate::reference::ExprId;
use crate::semantics;
use crate::types::Value;

/// What a recogniser sees: the failing constraint and a way to evaluate its parts.
pub struct IdiomContext<'a> {
    pub arena: &'a ExprArena,
    pub evaluator: &'a Evaluator<'a>,
    pub constraint: &'a Constraint,
    pub max_distance: f64,
}

impl IdiomContext<'_> {
    fn left(&self) -> &Node {
        self.arena.get(self.constraint.left())
    }

    /// The right operand, if it is an integer literal.
    fn right_constant(&self) -> Option<i64> {
        let node = self.arena.get(self.constraint.right());
        match (&node.kind, &node.value) {
            (ExprKind::Constant, Value::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    fn comparator(&self) -> Comparator {
        self.constraint.comparator()
    }

    fn eval_int(&self, id: ExprId) -> Option<i64> {
        self.evaluator.evaluate_int(id).ok()
    }

    /// The value of `id`, if it is a valid code point.
    fn eval_code_point(&self, id: ExprId) -> Option<i64> {
        self.eval_int(id).filter(|&c| (0..=char::MAX as i64).contains(&c))
    }

    fn eval_chars(&self, id: ExprId) -> Option<Vec<char>> {
        self.evaluator.evaluate_str(id).ok().map(|s| s.chars().collect())
    }

    /// `Some(true)` if the predicate on the left must become true, `Some(false)`
    /// if it must become false, `None` if the right side is not a boolean literal.
    fn wanted_truth(&self) -> Option<bool> {
        match (self.comparator(), self.right_constant()?) {
            (Comparator::Eq, 1) | (Comparator::Ne, 0) => Some(true),
            (Comparator::Eq, 0) | (Comparator::Ne, 1) => Some(false),
            _ => None,
        }
    }
}

/// Returns `None` if the constraint does not have the recogniser's shape.
pub type IdiomFn = fn(&IdiomContext) -> Option<f64>;

pub const IDIOMS: &[(&str, IdiomFn)] = &[
    ("index_of_char_found", index_of_char_found),
    ("index_of_char_from_found", index_of_char_from_found),
    ("index_of_char_equals_k", index_of_char_equals_k),
    ("index_of_char_from_equals_k", index_of_char_from_equals_k),
    ("char_class", char_class),
    ("string_reader", string_reader),
    ("is_integer", is_integer),
    ("has_more_tokens", has_more_tokens),
];

/// Runs the recognisers in order and returns the first usable distance.
///
/// A match yielding NaN, zero or a negative value has no gradient for the
/// failing constraint and the next recogniser is tried.
pub fn recognize(ctx: &IdiomContext) -> Option<(&'static str, f64)> {
    for &(name, idiom) in IDIOMS {
        match idiom(ctx) {
            Some(distance) if distance > 0.0 => {
                debug!("idiom {} => {}", name, distance);
                return Some((name, distance));
            }
            Some(distance) => debug!("idiom {} matched without gradient ({})", name, distance),
            None => {}
        }
    }
    None
}

fn char_gap(a: char, c: i64) -> f64 {
    (a as i128 - c as i128).unsigned_abs() as f64
}

fn min_char_gap(s: &[char], c: i64) -> f64 {
    s.iter().map(|&a| char_gap(a, c)).fold(f64::MAX, f64::min)
}

/// `s.indexOf(c) != -1`
fn index_of_char_found(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::Binary {
        op: Operator::IndexOfChar,
        left: string,
        right: ch,
    } = ctx.left().kind
    else {
        return None;
    };
    if ctx.comparator() != Comparator::Ne || ctx.right_constant()? != -1 {
        return None;
    }
    let s = ctx.eval_chars(string)?;
    if s.is_empty() {
        return Some(ctx.max_distance);
    }
    Some(min_char_gap(&s, ctx.eval_code_point(ch)?))
}

/// `s.indexOf(c, from) != -1`
fn index_of_char_from_found(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::Multi {
        op: Operator::IndexOfChar,
        left: string,
        right: ch,
        ref others,
    } = ctx.left().kind
    else {
        return None;
    };
    if ctx.comparator() != Comparator::Ne || ctx.right_constant()? != -1 {
        return None;
    }
    let s = ctx.eval_chars(string)?;
    let from = ctx.eval_int(*others.first()?)?;
    if from > s.len() as i64 - 1 {
        return Some(ctx.max_distance);
    }
    Some(min_char_gap(&s[from.max(0) as usize..], ctx.eval_code_point(ch)?))
}

/// Distance of `s[k]` from `c`, for `indexOf == k`.
fn char_at_k_gap(ctx: &IdiomContext, string: ExprId, ch: ExprId, last_index: i64) -> Option<f64> {
    let k = ctx.right_constant()?;
    let c = ctx.eval_code_point(ch)?;
    if k > last_index {
        return Some(ctx.max_distance);
    }
    if k < 0 {
        return None;
    }
    let s = ctx.eval_chars(string)?;
    let current = *s.get(k as usize)?;
    Some(char_gap(current, c))
}

/// `s.indexOf(c) == k`
fn index_of_char_equals_k(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::Binary {
        op: Operator::IndexOfChar,
        left: string,
        right: ch,
    } = ctx.left().kind
    else {
        return None;
    };
    if ctx.comparator() != Comparator::Eq {
        return None;
    }
    let len = ctx.eval_chars(string)?.len() as i64;
    char_at_k_gap(ctx, string, ch, len - 1)
}

/// `s.indexOf(c, from) == k`
fn index_of_char_from_equals_k(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::Multi {
        op: Operator::IndexOfChar,
        left: string,
        right: ch,
        ref others,
    } = ctx.left().kind
    else {
        return None;
    };
    if ctx.comparator() != Comparator::Eq {
        return None;
    }
    let len = ctx.eval_chars(string)?.len() as i64;
    // A negative start searches from the beginning.
    let from = ctx.eval_int(*others.first()?)?.clamp(0, len);
    char_at_k_gap(ctx, string, ch, len - from - 1)
}

/// Gap from `c` to the nearest of the ranges, 0 inside one.
fn gap_to_ranges(c: i64, ranges: &[(char, char)]) -> f64 {
    ranges
        .iter()
        .map(|&(lo, hi)| {
            let (lo, hi) = (lo as i64, hi as i64);
            if c < lo {
                lo - c
            } else if c > hi {
                c - hi
            } else {
                0
            }
        })
        .min()
        .map_or(f64::MAX, |gap| gap as f64)
}

/// Steps needed to leave the range containing `c`, 0 outside all ranges.
fn gap_out_of_ranges(c: i64, ranges: &[(char, char)]) -> f64 {
    ranges
        .iter()
        .find(|&&(lo, hi)| (lo as i64..=hi as i64).contains(&c))
        .map_or(0.0, |&(lo, hi)| ((c - lo as i64).min(hi as i64 - c) + 1) as f64)
}

const DIGITS: &[(char, char)] = &[('0', '9')];
const LETTERS: &[(char, char)] = &[('A', 'Z'), ('a', 'z')];

/// `isDigit(c)` or `isLetter(c)` compared with a boolean.
fn char_class(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::Unary { op, operand } = ctx.left().kind else {
        return None;
    };
    let (ranges, classify): (&[(char, char)], fn(i64) -> bool) = match op {
        Operator::IsDigit => (DIGITS, semantics::is_digit),
        Operator::IsLetter => (LETTERS, semantics::is_letter),
        _ => return None,
    };
    let want = ctx.wanted_truth()?;
    let c = ctx.eval_code_point(operand)?;
    let distance = if want {
        if classify(c) {
            0.0
        } else {
            gap_to_ranges(c, ranges)
        }
    } else if !classify(c) {
        0.0
    } else {
        // Letters outside of ASCII are one step from a non-letter.
        gap_out_of_ranges(c, ranges).max(1.0)
    };
    Some(distance)
}

/// `reader.read()` compared with end of stream.
fn string_reader(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::StringReader { string, position } = ctx.left().kind else {
        return None;
    };
    let len = ctx.eval_chars(string)?.len() as i64;
    let position = position as i64;
    let want_end = match (ctx.comparator(), ctx.right_constant()?) {
        (Comparator::Lt, 0) | (Comparator::Eq, -1) => true,
        (Comparator::Ge, 0) | (Comparator::Ne, -1) => false,
        _ => return None,
    };
    let distance = if want_end {
        if len <= position {
            0
        } else {
            len - position
        }
    } else if len > position {
        0
    } else {
        position - len + 1
    };
    Some(distance as f64)
}

/// `isInteger(s)` must become true.
fn is_integer(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::Unary {
        op: Operator::IsInteger,
        operand,
    } = ctx.left().kind
    else {
        return None;
    };
    if !ctx.wanted_truth()? {
        return None;
    }
    let s = ctx.eval_chars(operand)?;
    if s.is_empty() {
        return Some(ctx.max_distance);
    }
    let distance = s
        .iter()
        .map(|&c| gap_to_ranges(c as i64, DIGITS))
        .fold(0.0, f64::max);
    Some(distance)
}

/// `tokenizer.hasMoreTokens()` must become true.
fn has_more_tokens(ctx: &IdiomContext) -> Option<f64> {
    let ExprKind::HasMoreTokens { tokenizer } = ctx.left().kind else {
        return None;
    };
    if !ctx.wanted_truth()? {
        return None;
    }
    let origin = ctx.arena.tokenizer_origin(tokenizer)?;
    let s = ctx.evaluator.evaluate_str(origin.string).ok()?;
    let delimiters = ctx.evaluator.evaluate_str(origin.delimiters).ok()?;
    if s.chars().count() < delimiters.chars().count() * origin.consumed {
        return Some(ctx.max_distance);
    }
    let available = semantics::tokens(&s, &delimiters).len();
    let needed = (origin.consumed + 1).saturating_sub(available);
    Some(needed as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::constraint::ConstraintConfig;
    use crate::error::Result;

    use test_log::test;

    const MAX: f64 = f64::MAX;

    fn run(arena: &ExprArena, left: ExprId, cmp: Comparator, right: ExprId) -> Option<(&'static str, f64)> {
        let constraint = Constraint::new(arena, left, cmp, right, &ConstraintConfig::default()).unwrap();
        let evaluator = Evaluator::new(arena);
        let ctx = IdiomContext {
            arena,
            evaluator: &evaluator,
            constraint: &constraint,
            max_distance: MAX,
        };
        recognize(&ctx)
    }

    fn index_of(arena: &mut ExprArena, s: &str, c: char, from: Option<i64>) -> Result<ExprId> {
        let s = arena.mk_var("s", s)?;
        let c = arena.mk_int(c as i64);
        match from {
            None => arena.mk_binary(Operator::IndexOfChar, s, c),
            Some(from) => {
                let from = arena.mk_int(from);
                arena.mk_multi(Operator::IndexOfChar, s, c, &[from])
            }
        }
    }

    #[test]
    fn test_idiom_order() {
        let names: Vec<&str> = IDIOMS.iter().map(|&(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                "index_of_char_found",
                "index_of_char_from_found",
                "index_of_char_equals_k",
                "index_of_char_from_equals_k",
                "char_class",
                "string_reader",
                "is_integer",
                "has_more_tokens",
            ]
        );
    }

    #[test]
    fn test_index_of_char_found() {
        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "hello", 'z', None).unwrap();
        let minus_one = arena.mk_int(-1);
        assert_eq!(
            run(&arena, idx, Comparator::Ne, minus_one),
            Some(("index_of_char_found", 11.0))
        );

        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "", 'z', None).unwrap();
        let minus_one = arena.mk_int(-1);
        assert_eq!(run(&arena, idx, Comparator::Ne, minus_one), Some(("index_of_char_found", MAX)));
    }

    #[test]
    fn test_index_of_char_from_found() {
        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "zzab", 'z', Some(2)).unwrap();
        let minus_one = arena.mk_int(-1);
        assert_eq!(
            run(&arena, idx, Comparator::Ne, minus_one),
            Some(("index_of_char_from_found", 24.0))
        );

        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "zzab", 'z', Some(4)).unwrap();
        let minus_one = arena.mk_int(-1);
        assert_eq!(
            run(&arena, idx, Comparator::Ne, minus_one),
            Some(("index_of_char_from_found", MAX))
        );
    }

    #[test]
    fn test_index_of_char_equals_k() {
        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "abc", 'x', None).unwrap();
        let k = arena.mk_int(1);
        assert_eq!(run(&arena, idx, Comparator::Eq, k), Some(("index_of_char_equals_k", 22.0)));

        let k = arena.mk_int(3);
        assert_eq!(run(&arena, idx, Comparator::Eq, k), Some(("index_of_char_equals_k", MAX)));
    }

    #[test]
    fn test_index_of_equals_k_without_gradient_falls_through() {
        // 'a' already sits at index 2, but an earlier 'a' wins.
        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "aba", 'a', None).unwrap();
        let k = arena.mk_int(2);
        assert_eq!(run(&arena, idx, Comparator::Eq, k), None);
    }

    #[test]
    fn test_index_of_char_from_equals_k() {
        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "abcd", 'x', Some(1)).unwrap();
        let k = arena.mk_int(2);
        assert_eq!(
            run(&arena, idx, Comparator::Eq, k),
            Some(("index_of_char_from_equals_k", 21.0))
        );
        let k = arena.mk_int(3);
        assert_eq!(
            run(&arena, idx, Comparator::Eq, k),
            Some(("index_of_char_from_equals_k", MAX))
        );
    }

    #[test]
    fn test_extreme_operands() {
        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "hello").unwrap();
        let c = arena.mk_var("c", i64::MIN).unwrap();
        let idx = arena.mk_binary(Operator::IndexOfChar, s, c).unwrap();
        let minus_one = arena.mk_int(-1);
        assert_eq!(run(&arena, idx, Comparator::Ne, minus_one), None);

        let mut arena = ExprArena::new();
        let idx = index_of(&mut arena, "abc", 'x', Some(i64::MIN)).unwrap();
        let zero = arena.mk_int(0);
        assert_eq!(
            run(&arena, idx, Comparator::Eq, zero),
            Some(("index_of_char_from_equals_k", 23.0))
        );
        let idx = index_of(&mut arena, "abc", 'x', Some(i64::MAX)).unwrap();
        assert_eq!(
            run(&arena, idx, Comparator::Eq, zero),
            Some(("index_of_char_from_equals_k", MAX))
        );

        let mut arena = ExprArena::new();
        let c = arena.mk_var("c", i64::MAX).unwrap();
        let is_digit = arena.mk_unary(Operator::IsDigit, c).unwrap();
        let one = arena.mk_int(1);
        assert_eq!(run(&arena, is_digit, Comparator::Eq, one), None);
    }

    #[test]
    fn test_char_class() {
        let mut arena = ExprArena::new();
        let c = arena.mk_var("c", '(' as i64).unwrap();
        let is_digit = arena.mk_unary(Operator::IsDigit, c).unwrap();
        let is_letter = arena.mk_unary(Operator::IsLetter, c).unwrap();
        let one = arena.mk_int(1);
        let zero = arena.mk_int(0);

        assert_eq!(run(&arena, is_digit, Comparator::Eq, one), Some(("char_class", 8.0)));
        assert_eq!(run(&arena, is_digit, Comparator::Ne, zero), Some(("char_class", 8.0)));
        assert_eq!(run(&arena, is_letter, Comparator::Eq, one), Some(("char_class", 25.0)));

        let mut arena = ExprArena::new();
        let c = arena.mk_var("c", '[' as i64).unwrap();
        let is_letter = arena.mk_unary(Operator::IsLetter, c).unwrap();
        let one = arena.mk_int(1);
        assert_eq!(run(&arena, is_letter, Comparator::Eq, one), Some(("char_class", 1.0)));

        let mut arena = ExprArena::new();
        let c = arena.mk_var("c", '7' as i64).unwrap();
        let is_digit = arena.mk_unary(Operator::IsDigit, c).unwrap();
        let zero = arena.mk_int(0);
        assert_eq!(run(&arena, is_digit, Comparator::Eq, zero), Some(("char_class", 3.0)));

        let mut arena = ExprArena::new();
        let c = arena.mk_var("c", 'b' as i64).unwrap();
        let is_letter = arena.mk_unary(Operator::IsLetter, c).unwrap();
        let one = arena.mk_int(1);
        assert_eq!(run(&arena, is_letter, Comparator::Ne, one), Some(("char_class", 2.0)));
    }

    #[test]
    fn test_string_reader() {
        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "abc").unwrap();
        let read = arena.mk_string_reader(s, 1).unwrap();
        let minus_one = arena.mk_int(-1);
        let zero = arena.mk_int(0);
        assert_eq!(run(&arena, read, Comparator::Eq, minus_one), Some(("string_reader", 2.0)));
        assert_eq!(run(&arena, read, Comparator::Lt, zero), Some(("string_reader", 2.0)));

        let read = arena.mk_string_reader(s, 5).unwrap();
        assert_eq!(run(&arena, read, Comparator::Ne, minus_one), Some(("string_reader", 3.0)));
        assert_eq!(run(&arena, read, Comparator::Ge, zero), Some(("string_reader", 3.0)));
    }

    #[test]
    fn test_is_integer() {
        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "1a2").unwrap();
        let is_int = arena.mk_unary(Operator::IsInteger, s).unwrap();
        let zero = arena.mk_int(0);
        assert_eq!(run(&arena, is_int, Comparator::Ne, zero), Some(("is_integer", 40.0)));

        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "").unwrap();
        let is_int = arena.mk_unary(Operator::IsInteger, s).unwrap();
        let zero = arena.mk_int(0);
        assert_eq!(run(&arena, is_int, Comparator::Ne, zero), Some(("is_integer", MAX)));
    }

    #[test]
    fn test_is_integer_overflow_falls_through() {
        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "99999999999").unwrap();
        let is_int = arena.mk_unary(Operator::IsInteger, s).unwrap();
        let one = arena.mk_int(1);
        assert_eq!(run(&arena, is_int, Comparator::Eq, one), None);
    }

    #[test]
    fn test_has_more_tokens() {
        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "a b").unwrap();
        let d = arena.mk_str(" ");
        let t0 = arena.mk_tokenizer(s, d).unwrap();
        let t1 = arena.mk_next_tokenizer(t0).unwrap();
        let t2 = arena.mk_next_tokenizer(t1).unwrap();
        let more = arena.mk_has_more_tokens(t2).unwrap();
        let zero = arena.mk_int(0);
        assert_eq!(run(&arena, more, Comparator::Ne, zero), Some(("has_more_tokens", 1.0)));
    }

    #[test]
    fn test_unrelated_shapes_are_ignored() {
        let mut arena = ExprArena::new();
        let x = arena.mk_var("x", 3).unwrap();
        let five = arena.mk_int(5);
        assert_eq!(run(&arena, x, Comparator::Gt, five), None);
    }
}
