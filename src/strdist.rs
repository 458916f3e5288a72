//! Distances between strings, used to guide string predicates towards `true`.
//!
//! The basic measure is the *AVM distance*: the length difference plus, for
//! every aligned pair of characters, the normalised code-point gap. Changing a
//! single character towards its target always decreases it, which is what an
//! alternating-variable search needs.

/// Maps a non-negative gap into `[0, 1)`.
pub type Normalizer = fn(f64) -> f64;

pub const DEFAULT_NORMALIZER: Normalizer = normalize;

/// `x / (x + 1)`.
pub fn normalize(x: f64) -> f64 {
    x / (x + 1.0)
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn avm_chars(s: &[char], t: &[char], normalizer: Normalizer) -> f64 {
    let mut distance = s.len().abs_diff(t.len()) as f64;
    for (&a, &b) in s.iter().zip(t) {
        distance += normalizer((a as i64 - b as i64).abs() as f64);
    }
    distance
}

fn equals_chars(s: &[char], t: &[char], normalizer: Normalizer) -> f64 {
    if s == t {
        0.0
    } else {
        avm_chars(s, t, normalizer)
    }
}

pub fn avm(s: &str, t: &str, normalizer: Normalizer) -> f64 {
    avm_chars(&chars(s), &chars(t), normalizer)
}

/// Distance of `s` from being equal to `t`.
pub fn equals(s: &str, t: &str, normalizer: Normalizer) -> f64 {
    if s == t {
        0.0
    } else {
        avm(s, t, normalizer)
    }
}

pub fn equals_ignore_case(s: &str, t: &str, normalizer: Normalizer) -> f64 {
    equals(&s.to_lowercase(), &t.to_lowercase(), normalizer)
}

pub fn ends_with(value: &str, suffix: &str, normalizer: Normalizer) -> f64 {
    let value = chars(value);
    let suffix = chars(suffix);
    let len = suffix.len().min(value.len());
    equals_chars(&value[value.len() - len..], &suffix, normalizer)
}

/// Distance of `value` from starting with `prefix` at offset `start`.
///
/// Returns `None` for an offset outside of `value`.
pub fn starts_with(value: &str, prefix: &str, start: i64, normalizer: Normalizer) -> Option<f64> {
    let value = chars(value);
    let prefix = chars(prefix);
    if start < 0 || start > value.len() as i64 {
        return None;
    }
    let start = start as usize;
    let len = prefix.len().min(value.len());
    let end = (start + len).min(value.len());
    Some(equals_chars(&value[start..end], &prefix, normalizer))
}

/// Minimum distance between `needle` and any window of `haystack`.
pub fn contains(haystack: &str, needle: &str, normalizer: Normalizer) -> f64 {
    let haystack = chars(haystack);
    let needle = chars(needle);
    if needle.is_empty() {
        return 0.0;
    }
    if needle.len() > haystack.len() {
        return avm_chars(&haystack, &needle, normalizer);
    }
    haystack
        .windows(needle.len())
        .map(|window| equals_chars(window, &needle, normalizer))
        .fold(f64::MAX, f64::min)
}

/// Distance of the region `value[this_start..]` from matching
/// `other[other_start..]` over `len` characters.
///
/// An out-of-range region yields how far the offsets are from fitting, which may
/// be zero or negative when there is no gradient.
///
/// ```
/// use symexpr_rs::strdist::{region_matches, DEFAULT_NORMALIZER};
///
/// assert_eq!(region_matches("hello", 1, "xell", 1, 3, false, DEFAULT_NORMALIZER), 0.0);
/// assert_eq!(region_matches("hi", 0, "hello", 0, 5, false, DEFAULT_NORMALIZER), 3.0);
/// ```
pub fn region_matches(
    value: &str,
    this_start: i64,
    other: &str,
    other_start: i64,
    len: i64,
    ignore_case: bool,
    normalizer: Normalizer,
) -> f64 {
    let (value, other) = if ignore_case {
        (chars(&value.to_lowercase()), chars(&other.to_lowercase()))
    } else {
        (chars(value), chars(other))
    };
    // Offsets and length are unconstrained i64 values.
    let (this_wide, other_wide, len_wide) = (this_start as i128, other_start as i128, len as i128);
    if other_start < 0 || other.len() as i128 - other_wide < len_wide {
        return (len_wide - other.len() as i128 + other_wide) as f64;
    }
    if this_start < 0 || value.len() as i128 - this_wide < len_wide {
        return (len_wide - value.len() as i128 + this_wide) as f64;
    }
    if len <= 0 {
        return 0.0;
    }
    let (this_start, other_start, len) = (this_start as usize, other_start as usize, len as usize);
    equals_chars(
        &value[this_start..this_start + len],
        &other[other_start..other_start + len],
        normalizer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    const N: Normalizer = DEFAULT_NORMALIZER;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(1.0), 0.5);
        assert_eq!(normalize(3.0), 0.75);
    }

    #[test]
    fn test_equals_ordering() {
        let same = equals("abc", "abc", N);
        let close = equals("abc", "abd", N);
        let far = equals("abc", "xyz", N);
        assert_eq!(same, 0.0);
        assert!(same < close && close < far);
        assert_eq!(close, 0.5);
    }

    #[test]
    fn test_length_difference() {
        assert_eq!(equals("", "abc", N), 3.0);
        assert_eq!(equals("ab", "abcd", N), 2.0);
        assert!(equals("ab", "abcd", N) > equals("abc", "abcd", N));
    }

    #[test]
    fn test_ignore_case() {
        assert_eq!(equals_ignore_case("HeLLo", "hello", N), 0.0);
        assert!(equals_ignore_case("Hello", "help", N) > 0.0);
    }

    #[test]
    fn test_ends_with() {
        assert_eq!(ends_with("hello", "llo", N), 0.0);
        assert_eq!(ends_with("hello", "llp", N), 0.5);
        assert!(ends_with("lo", "hello", N) > 3.0);
    }

    #[test]
    fn test_starts_with() {
        assert_eq!(starts_with("hello", "he", 0, N), Some(0.0));
        assert_eq!(starts_with("hello", "ll", 2, N), Some(0.0));
        assert_eq!(starts_with("hello", "lm", 2, N), Some(0.5));
        assert_eq!(starts_with("hello", "he", 6, N), None);
        assert_eq!(starts_with("hello", "he", -1, N), None);
    }

    #[test]
    fn test_contains() {
        assert_eq!(contains("hello world", "wor", N), 0.0);
        assert_eq!(contains("hello world", "wos", N), 0.5);
        assert_eq!(contains("ab", "abc", N), 1.0);
        assert_eq!(contains("abc", "", N), 0.0);
        assert_eq!(contains("", "", N), 0.0);
    }

    #[test]
    fn test_region_matches() {
        assert_eq!(region_matches("hello", 1, "xell", 1, 3, false, N), 0.0);
        assert_eq!(region_matches("hello", 1, "XELL", 1, 3, true, N), 0.0);
        assert_eq!(region_matches("hello", 1, "xelm", 1, 3, false, N), 0.5);
        assert_eq!(region_matches("hello", 0, "ab", 0, 5, false, N), 3.0);
        assert_eq!(region_matches("hi", 0, "hello", 0, 5, false, N), 3.0);
    }

    #[test]
    fn test_region_matches_extreme_offsets() {
        let d = region_matches("abc", 0, "abc", i64::MAX, i64::MAX, false, N);
        assert!(d > 1.8e19, "got {}", d);
        let d = region_matches("abc", i64::MAX, "abc", 0, 1, false, N);
        assert!(d > 9.2e18, "got {}", d);
        assert_eq!(region_matches("ab", 0, "cd", 0, i64::MIN, false, N), 0.0);
        assert!(region_matches("ab", i64::MIN, "cd", 0, 1, false, N) < 0.0);
    }
}
