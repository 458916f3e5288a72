//! Runtime semantics of the operator catalogue.
//!
//! These are the exact operations the instrumented program performed: integer
//! arithmetic wraps, shift distances are masked to six bits, real arithmetic is
//! IEEE-754, and string operations follow a standard string library character
//! for character. Strings are indexed by `char` (Unicode scalar value).
//!
//! Both the arena (when computing the cached value of a new node) and the
//! [`Evaluator`][crate::eval::Evaluator] go through [`apply`] and [`cast`], so
//! there is a single implementation of every operator.

use regex::Regex;

use crate::error::{Error, Result};
use crate::operator::Operator;
use crate::types::{Domain, Value};

/// Applies `op` to already evaluated operands (`left, right, aux...`).
pub fn apply(op: Operator, args: &[Value]) -> Result<Value> {
    use Operator::*;
    use Value::{Integer as Int, IntegerArray, Real, RealArray, Str, StrArray};

    let value = match (op, args) {
        // Integer arithmetic
        (Plus, [Int(a), Int(b)]) => Int(a.wrapping_add(*b)),
        (Minus, [Int(a), Int(b)]) => Int(a.wrapping_sub(*b)),
        (Mul, [Int(a), Int(b)]) => Int(a.wrapping_mul(*b)),
        (Div, [Int(a), Int(b)]) => {
            if *b == 0 {
                return Err(Error::DivisionByZero);
            }
            Int(a.wrapping_div(*b))
        }
        (Rem, [Int(a), Int(b)]) => {
            if *b == 0 {
                return Err(Error::DivisionByZero);
            }
            Int(a.wrapping_rem(*b))
        }
        (Max, [Int(a), Int(b)]) => Int(*a.max(b)),
        (Min, [Int(a), Int(b)]) => Int(*a.min(b)),
        (Neg, [Int(a)]) => Int(a.wrapping_neg()),
        (Abs, [Int(a)]) => Int(a.wrapping_abs()),
        (Shl, [Int(a), Int(b)]) => Int(a.wrapping_shl((b & 63) as u32)),
        (Shr, [Int(a), Int(b)]) => Int(a >> (b & 63)),
        (UShr, [Int(a), Int(b)]) => Int(((*a as u64) >> (b & 63)) as i64),
        (BitAnd, [Int(a), Int(b)]) => Int(a & b),
        (BitOr, [Int(a), Int(b)]) => Int(a | b),
        (BitXor, [Int(a), Int(b)]) => Int(a ^ b),
        (IsDigit, [Int(c)]) => Value::bool(is_digit(*c)),
        (IsLetter, [Int(c)]) => Value::bool(is_letter(*c)),
        (NumericValue, [Int(c)]) => Int(numeric_value(*c)),

        // Real to integer
        (Round, [Real(x)]) => Int(round(*x)),
        (GetExponent, [Real(x)]) => Int(get_exponent(*x)),

        // Real arithmetic
        (Plus, [Real(a), Real(b)]) => Real(a + b),
        (Minus, [Real(a), Real(b)]) => Real(a - b),
        (Mul, [Real(a), Real(b)]) => Real(a * b),
        (Div, [Real(a), Real(b)]) => Real(a / b),
        (Rem, [Real(a), Real(b)]) => Real(a % b),
        (Max, [Real(a), Real(b)]) => Real(max(*a, *b)),
        (Min, [Real(a), Real(b)]) => Real(min(*a, *b)),
        (Atan2, [Real(a), Real(b)]) => Real(a.atan2(*b)),
        (CopySign, [Real(a), Real(b)]) => Real(a.copysign(*b)),
        (Hypot, [Real(a), Real(b)]) => Real(a.hypot(*b)),
        (IeeeRemainder, [Real(a), Real(b)]) => Real(ieee_remainder(*a, *b)),
        (NextAfter, [Real(a), Real(b)]) => Real(next_after(*a, *b)),
        (Pow, [Real(a), Real(b)]) => Real(a.powf(*b)),
        (Scalb, [Real(a), Real(b)]) => Real(scalb(*a, *b as i32)),
        (Neg, [Real(x)]) => Real(-x),
        (Abs, [Real(x)]) => Real(x.abs()),
        (Acos, [Real(x)]) => Real(x.acos()),
        (Asin, [Real(x)]) => Real(x.asin()),
        (Atan, [Real(x)]) => Real(x.atan()),
        (Cbrt, [Real(x)]) => Real(x.cbrt()),
        (Ceil, [Real(x)]) => Real(x.ceil()),
        (Cos, [Real(x)]) => Real(x.cos()),
        (Cosh, [Real(x)]) => Real(x.cosh()),
        (Exp, [Real(x)]) => Real(x.exp()),
        (Expm1, [Real(x)]) => Real(x.exp_m1()),
        (Floor, [Real(x)]) => Real(x.floor()),
        (Log, [Real(x)]) => Real(x.ln()),
        (Log10, [Real(x)]) => Real(x.log10()),
        (Log1p, [Real(x)]) => Real(x.ln_1p()),
        (NextUp, [Real(x)]) => Real(next_up(*x)),
        (Rint, [Real(x)]) => Real(x.round_ties_even()),
        (Signum, [Real(x)]) => Real(signum(*x)),
        (Sin, [Real(x)]) => Real(x.sin()),
        (Sinh, [Real(x)]) => Real(x.sinh()),
        (Sqrt, [Real(x)]) => Real(x.sqrt()),
        (Tan, [Real(x)]) => Real(x.tan()),
        (Tanh, [Real(x)]) => Real(x.tanh()),
        (ToDegrees, [Real(x)]) => Real(x.to_degrees()),
        (ToRadians, [Real(x)]) => Real(x.to_radians()),
        (Ulp, [Real(x)]) => Real(ulp(*x)),

        // String predicates
        (Equals, [Str(a), Str(b)]) => Value::bool(a == b),
        (EqualsIgnoreCase, [Str(a), Str(b)]) => Value::bool(equals_ignore_case(a, b)),
        (StartsWith, [Str(a), Str(b)]) => Value::bool(a.starts_with(b.as_str())),
        (StartsWith, [Str(a), Str(b), Int(offset)]) => Value::bool(starts_with_at(a, b, *offset)),
        (EndsWith, [Str(a), Str(b)]) => Value::bool(a.ends_with(b.as_str())),
        (Contains, [Str(a), Str(b)]) => Value::bool(a.contains(b.as_str())),
        (Matches, [Str(pattern), Str(s)]) => Value::bool(matches(pattern, s)?),
        (RegionMatches, [Str(a), Str(b), Int(a_start), Int(b_start), Int(len), Int(ignore_case)]) => {
            Value::bool(region_matches(*ignore_case != 0, a, *a_start, b, *b_start, *len))
        }

        // String queries
        (Length, [Str(s)]) => Int(s.chars().count() as i64),
        (IsInteger, [Str(s)]) => Value::bool(s.parse::<i32>().is_ok()),
        (CharAt, [Str(s), Int(index)]) => Int(char_at(s, *index)? as i64),
        (CompareTo, [Str(a), Str(b)]) => Int(compare_to(a, b)),
        (CompareToIgnoreCase, [Str(a), Str(b)]) => Int(compare_to_ignore_case(a, b)),
        (IndexOfChar, [Str(s), Int(c)]) => Int(index_of_char(&chars(s), *c, 0)),
        (IndexOfChar, [Str(s), Int(c), Int(from)]) => Int(index_of_char(&chars(s), *c, *from)),
        (LastIndexOfChar, [Str(s), Int(c)]) => {
            let cs = chars(s);
            let from = cs.len() as i64 - 1;
            Int(last_index_of_char(&cs, *c, from))
        }
        (LastIndexOfChar, [Str(s), Int(c), Int(from)]) => Int(last_index_of_char(&chars(s), *c, *from)),
        (IndexOfString, [Str(s), Str(t)]) => Int(index_of_str(&chars(s), &chars(t), 0)),
        (IndexOfString, [Str(s), Str(t), Int(from)]) => Int(index_of_str(&chars(s), &chars(t), *from)),
        (LastIndexOfString, [Str(s), Str(t)]) => {
            let cs = chars(s);
            let from = cs.len() as i64;
            Int(last_index_of_str(&cs, &chars(t), from))
        }
        (LastIndexOfString, [Str(s), Str(t), Int(from)]) => {
            Int(last_index_of_str(&chars(s), &chars(t), *from))
        }

        // String producers
        (Concat | AppendString, [Str(a), Str(b)]) => Str(format!("{}{}", a, b)),
        (AppendBoolean, [Str(a), Int(b)]) => Str(format!("{}{}", a, *b != 0)),
        (AppendChar, [Str(a), Int(c)]) => {
            let c = code_point(*c).ok_or(Error::InvalidCodePoint(*c))?;
            Str(format!("{}{}", a, c))
        }
        (AppendInteger, [Str(a), Int(b)]) => Str(format!("{}{}", a, b)),
        (AppendReal, [Str(a), Real(b)]) => Str(format!("{}{}", a, real_to_string(*b))),
        (Substring, [Str(s), Int(begin)]) => {
            let cs = chars(s);
            let end = cs.len() as i64;
            Str(substring(&cs, *begin, end)?)
        }
        (Substring, [Str(s), Int(begin), Int(end)]) => Str(substring(&chars(s), *begin, *end)?),
        (ReplaceChar, [Str(s), Int(old), Int(new)]) => Str(replace_char(s, *old, *new)?),
        (Replace, [Str(s), Str(target), Str(replacement)]) => Str(s.replace(target.as_str(), replacement)),
        (ReplaceAll, [Str(s), Str(pattern), Str(replacement)]) => {
            let re = compile(pattern)?;
            Str(re.replace_all(s, translate_replacement(replacement).as_str()).into_owned())
        }
        (ReplaceFirst, [Str(s), Str(pattern), Str(replacement)]) => {
            let re = compile(pattern)?;
            Str(re.replace(s, translate_replacement(replacement).as_str()).into_owned())
        }
        (ToLowerCase, [Str(s)]) => Str(s.to_lowercase()),
        (ToUpperCase, [Str(s)]) => Str(s.to_uppercase()),
        (Trim, [Str(s)]) => Str(s.trim_matches(|c: char| c <= ' ').to_string()),

        // Arrays
        (ArraySelect, [IntegerArray(a), Int(i)]) => Int(a[array_index(*i, a.len())?]),
        (ArraySelect, [RealArray(a), Int(i)]) => Real(a[array_index(*i, a.len())?]),
        (ArraySelect, [StrArray(a), Int(i)]) => Str(a[array_index(*i, a.len())?].clone()),
        (ArrayStore, [IntegerArray(a), Int(i), Int(v)]) => IntegerArray(store(a, *i, *v)?),
        (ArrayStore, [RealArray(a), Int(i), Real(v)]) => RealArray(store(a, *i, *v)?),
        (ArrayStore, [StrArray(a), Int(i), Str(v)]) => StrArray(store(a, *i, v.clone())?),

        _ => {
            let domains: Vec<Domain> = args.iter().map(Value::domain).collect();
            return Err(Error::unknown_operator(op, &domains));
        }
    };
    Ok(value)
}

/// Whether a cross-domain conversion from `from` to `to` exists.
pub fn is_valid_cast(from: Domain, to: Domain) -> bool {
    matches!(
        (from, to),
        (Domain::Real, Domain::Integer)
            | (Domain::Integer, Domain::Real)
            | (Domain::String, Domain::Integer)
            | (Domain::Integer, Domain::String)
            | (Domain::Real, Domain::String)
    )
}

pub fn cast(value: &Value, target: Domain) -> Result<Value> {
    match (value, target) {
        // Saturating, NaN becomes 0.
        (Value::Real(x), Domain::Integer) => Ok(Value::Integer(*x as i64)),
        (Value::Integer(v), Domain::Real) => Ok(Value::Real(*v as f64)),
        (Value::Str(s), Domain::Integer) => parse_long(s).map(Value::Integer),
        (Value::Integer(v), Domain::String) => Ok(Value::Str(v.to_string())),
        (Value::Real(x), Domain::String) => Ok(Value::Str(real_to_string(*x))),
        (v, t) => Err(Error::domain_mismatch(format!("a value castable to {}", t), v.domain())),
    }
}

// ─── Arrays ────────────────────────────────────────────────────────────────────

fn array_index(index: i64, length: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < length)
        .ok_or(Error::IndexOutOfBounds { index, length })
}

/// Copy of `array` with `value` at `index`; the operand is not modified.
fn store<T: Clone>(array: &[T], index: i64, value: T) -> Result<Vec<T>> {
    let i = array_index(index, array.len())?;
    let mut copy = array.to_vec();
    copy[i] = value;
    Ok(copy)
}

// ─── Characters ────────────────────────────────────────────────────────────────

pub(crate) fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

pub fn code_point(value: i64) -> Option<char> {
    u32::try_from(value).ok().and_then(char::from_u32)
}

pub fn is_digit(c: i64) -> bool {
    (('0' as i64)..=('9' as i64)).contains(&c)
}

pub fn is_letter(c: i64) -> bool {
    code_point(c).is_some_and(char::is_alphabetic)
}

fn numeric_value(c: i64) -> i64 {
    code_point(c)
        .and_then(|c| c.to_digit(36))
        .map_or(-1, |d| d as i64)
}

fn to_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn to_lower(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn chars_equal_ignore_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    let (ua, ub) = (to_upper(a), to_upper(b));
    ua == ub || to_lower(ua) == to_lower(ub)
}

// ─── Strings ───────────────────────────────────────────────────────────────────

pub fn equals_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count() && a.chars().zip(b.chars()).all(|(x, y)| chars_equal_ignore_case(x, y))
}

pub fn compare_to(a: &str, b: &str) -> i64 {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return x as i64 - y as i64;
        }
    }
    a.chars().count() as i64 - b.chars().count() as i64
}

pub fn compare_to_ignore_case(a: &str, b: &str) -> i64 {
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            let (ux, uy) = (to_upper(x), to_upper(y));
            if ux != uy {
                let (lx, ly) = (to_lower(ux), to_lower(uy));
                if lx != ly {
                    return lx as i64 - ly as i64;
                }
            }
        }
    }
    a.chars().count() as i64 - b.chars().count() as i64
}

fn starts_with_at(s: &str, prefix: &str, offset: i64) -> bool {
    let cs = chars(s);
    let ps = chars(prefix);
    if offset < 0 || offset > cs.len() as i64 - ps.len() as i64 {
        return false;
    }
    let offset = offset as usize;
    cs[offset..offset + ps.len()] == ps[..]
}

pub fn region_matches(ignore_case: bool, a: &str, a_start: i64, b: &str, b_start: i64, len: i64) -> bool {
    let ca = chars(a);
    let cb = chars(b);
    let len_wide = len as i128;
    if a_start < 0
        || b_start < 0
        || a_start as i128 > ca.len() as i128 - len_wide
        || b_start as i128 > cb.len() as i128 - len_wide
    {
        return false;
    }
    if len <= 0 {
        return true;
    }
    let (a_start, b_start, len) = (a_start as usize, b_start as usize, len as usize);
    ca[a_start..a_start + len]
        .iter()
        .zip(&cb[b_start..b_start + len])
        .all(|(&x, &y)| if ignore_case { chars_equal_ignore_case(x, y) } else { x == y })
}

fn char_at(s: &str, index: i64) -> Result<char> {
    let cs = chars(s);
    usize::try_from(index)
        .ok()
        .and_then(|i| cs.get(i).copied())
        .ok_or(Error::IndexOutOfBounds {
            index,
            length: cs.len(),
        })
}

pub fn index_of_char(s: &[char], c: i64, from: i64) -> i64 {
    let Some(c) = code_point(c) else {
        return -1;
    };
    let from = from.max(0);
    if from >= s.len() as i64 {
        return -1;
    }
    s[from as usize..]
        .iter()
        .position(|&x| x == c)
        .map_or(-1, |i| i as i64 + from)
}

pub fn last_index_of_char(s: &[char], c: i64, from: i64) -> i64 {
    let Some(c) = code_point(c) else {
        return -1;
    };
    if from < 0 || s.is_empty() {
        return -1;
    }
    let from = from.min(s.len() as i64 - 1) as usize;
    s[..=from].iter().rposition(|&x| x == c).map_or(-1, |i| i as i64)
}

pub fn index_of_str(s: &[char], t: &[char], from: i64) -> i64 {
    let len = s.len() as i64;
    if from >= len {
        return if t.is_empty() { len } else { -1 };
    }
    let from = from.max(0) as usize;
    if t.is_empty() {
        return from as i64;
    }
    if t.len() > s.len() {
        return -1;
    }
    (from..=s.len() - t.len())
        .find(|&i| s[i..i + t.len()] == *t)
        .map_or(-1, |i| i as i64)
}

pub fn last_index_of_str(s: &[char], t: &[char], from: i64) -> i64 {
    let right = s.len() as i64 - t.len() as i64;
    let from = from.min(right);
    if from < 0 {
        return -1;
    }
    if t.is_empty() {
        return from;
    }
    (0..=from as usize)
        .rev()
        .find(|&i| s[i..i + t.len()] == *t)
        .map_or(-1, |i| i as i64)
}

fn substring(s: &[char], begin: i64, end: i64) -> Result<String> {
    if begin < 0 || end > s.len() as i64 || begin > end {
        let index = if begin < 0 || begin > end { begin } else { end };
        return Err(Error::IndexOutOfBounds {
            index,
            length: s.len(),
        });
    }
    Ok(s[begin as usize..end as usize].iter().collect())
}

fn replace_char(s: &str, old: i64, new: i64) -> Result<String> {
    let Some(old) = code_point(old) else {
        return Ok(s.to_string());
    };
    let new = code_point(new).ok_or(Error::InvalidCodePoint(new))?;
    Ok(s.chars().map(|c| if c == old { new } else { c }).collect())
}

/// Parses a signed decimal 64-bit integer.
pub fn parse_long(s: &str) -> Result<i64> {
    s.parse::<i64>().map_err(|_| Error::NumberFormat { input: s.to_string() })
}

/// Code point read by a stream positioned at `position`, or `-1` at end of
/// stream.
pub fn read_at(s: &str, position: usize) -> i64 {
    s.chars().nth(position).map_or(-1, |c| c as i64)
}

// ─── Patterns ──────────────────────────────────────────────────────────────────

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Whole-string match of `s` against `pattern`.
pub fn matches(pattern: &str, s: &str) -> Result<bool> {
    let anchored = compile(&format!("^(?:{})$", pattern)).map_err(|e| match e {
        Error::InvalidPattern { message, .. } => Error::InvalidPattern {
            pattern: pattern.to_string(),
            message,
        },
        other => other,
    })?;
    Ok(anchored.is_match(s))
}

/// Rewrites a replacement string with `\`-escapes and `$n` group references
/// into the syntax of the `regex` crate.
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut it = replacement.chars().peekable();
    while let Some(c) = it.next() {
        match c {
            '\\' => {
                if let Some(next) = it.next() {
                    if next == '$' {
                        out.push_str("$$");
                    } else {
                        out.push(next);
                    }
                }
            }
            '$' => {
                let mut group = String::new();
                while let Some(d) = it.peek().copied().filter(char::is_ascii_digit) {
                    group.push(d);
                    it.next();
                }
                if group.is_empty() {
                    out.push('$');
                } else {
                    out.push_str(&format!("${{{}}}", group));
                }
            }
            c => out.push(c),
        }
    }
    out
}

// ─── Tokenizers ────────────────────────────────────────────────────────────────

fn is_delimiter(c: char, delimiters: &str) -> bool {
    delimiters.contains(c)
}

/// Splits `s` into the tokens a delimiter-based tokenizer would produce.
pub fn tokens(s: &str, delimiters: &str) -> Vec<String> {
    s.split(|c| is_delimiter(c, delimiters))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn has_more_tokens(remaining: &str, delimiters: &str) -> bool {
    remaining.chars().any(|c| !is_delimiter(c, delimiters))
}

/// Splits the next token off `remaining`, returning the token and the text
/// after it.
pub fn next_token<'s>(remaining: &'s str, delimiters: &str) -> Result<(&'s str, &'s str)> {
    let start = remaining
        .char_indices()
        .find(|&(_, c)| !is_delimiter(c, delimiters))
        .map(|(i, _)| i)
        .ok_or(Error::NoSuchToken)?;
    let rest = &remaining[start..];
    let end = rest
        .char_indices()
        .find(|&(_, c)| is_delimiter(c, delimiters))
        .map_or(rest.len(), |(i, _)| i);
    Ok((&rest[..end], &rest[end..]))
}

// ─── Reals ─────────────────────────────────────────────────────────────────────

/// Rounds half up (towards positive infinity), saturating; NaN rounds to 0.
pub fn round(x: f64) -> i64 {
    if x.is_nan() {
        return 0;
    }
    let f = x.floor();
    let r = if x - f >= 0.5 { f + 1.0 } else { f };
    r as i64
}

/// Unbiased exponent; 1024 for NaN and infinities, -1023 for zero and
/// subnormals.
pub fn get_exponent(x: f64) -> i64 {
    ((x.to_bits() >> 52) & 0x7ff) as i64 - 1023
}

fn max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == 0.0 && b == 0.0 {
        return if a.is_sign_negative() { b } else { a };
    }
    if a >= b {
        a
    } else {
        b
    }
}

fn min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == 0.0 && b == 0.0 {
        return if b.is_sign_negative() { b } else { a };
    }
    if a <= b {
        a
    } else {
        b
    }
}

fn signum(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        1f64.copysign(x)
    }
}

fn ieee_remainder(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() || x.is_infinite() || y == 0.0 {
        return f64::NAN;
    }
    if y.is_infinite() {
        return x;
    }
    x - y * (x / y).round_ties_even()
}

pub fn next_after(start: f64, direction: f64) -> f64 {
    if start.is_nan() || direction.is_nan() {
        return start + direction;
    }
    if start == direction {
        return direction;
    }
    if start == 0.0 {
        let tiny = f64::from_bits(1);
        return if direction > 0.0 { tiny } else { -tiny };
    }
    let bits = start.to_bits();
    let away_from_zero = (direction > start) == (start > 0.0);
    f64::from_bits(if away_from_zero { bits + 1 } else { bits - 1 })
}

pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        x
    } else {
        next_after(x, f64::INFINITY)
    }
}

fn ulp(x: f64) -> f64 {
    if x.is_nan() {
        return x;
    }
    let a = x.abs();
    if a.is_infinite() {
        return f64::INFINITY;
    }
    if a == f64::MAX {
        return 2f64.powi(971);
    }
    next_up(a) - a
}

fn scalb(x: f64, n: i32) -> f64 {
    let mut n = n.clamp(-2200, 2200);
    let mut x = x;
    while n > 1000 {
        x *= 2f64.powi(1000);
        n -= 1000;
    }
    while n < -1000 {
        x *= 2f64.powi(-1000);
        n += 1000;
    }
    x * 2f64.powi(n)
}

/// Decimal rendering of a real: `1.0`, `0.001`, `1.0E7`, `1.5E-4`, `NaN`,
/// `Infinity`.
pub fn real_to_string(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    if (1e-3..1e7).contains(&x.abs()) {
        let s = format!("{}", x);
        return if s.contains('.') { s } else { format!("{}.0", s) };
    }
    let s = format!("{:e}", x);
    match s.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => s,
    }
}
