//! Scalar parsers used by the normalization pipeline.
//!
//! Every parser returns `Option`: `Some` means the input matched (even when
//! the matched value is `Value::Null`), `None` means "no match" and the
//! pipeline moves on to the next stage. Nothing in here returns an error; a
//! value that merely looks like a typed literal (`0xZZ`, `1h30mX`) is simply
//! not a match.

use std::sync::LazyLock;

use regex::Regex;

use crate::options::PercentMode;
use crate::units;
use crate::value::Value;

const NULL_SENTINELS: [&str; 4] = ["null", "none", "nil", "undefined"];
const TRUE_SENTINELS: [&str; 5] = ["true", "yes", "y", "on", "1"];
const FALSE_SENTINELS: [&str; 5] = ["false", "no", "n", "off", "0"];

/// Replacements are applied one after another over the whole string, in this
/// order, so a later pair can act on text produced by an earlier one.
const ESCAPES: [(&str, &str); 9] = [
    (r"\\", "\\"),
    (r#"\""#, "\""),
    (r"\'", "'"),
    (r"\n", "\n"),
    (r"\r", "\r"),
    (r"\t", "\t"),
    (r"\b", "\u{8}"),
    (r"\f", "\u{c}"),
    (r"\0", "\0"),
];

static DURATION_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<value>[0-9]+(?:\.[0-9]+)?)(?P<unit>ns|us|µs|ms|s|m|h|d|w)")
        .expect("duration pattern is valid")
});

static BYTE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<num>[+-]?[0-9]+(?:\.[0-9]+)?)\s*(?P<unit>[A-Za-z]+)?\s*$")
        .expect("byte size pattern is valid")
});

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer pattern is valid"));

static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("float pattern is valid")
});

/// Strip one pair of matching `"` or `'` quotes.
pub fn strip_matching_quotes(s: &str) -> Option<&str> {
    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')));
    quoted.then(|| &s[1..s.len() - 1])
}

/// Turn backslash escapes inside a quoted value into the characters they name.
pub fn unescape_quoted(s: &str) -> String {
    ESCAPES
        .iter()
        .fold(s.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Expand a leading `~/` or `~\` to the invoking user's home directory.
///
/// Returns `None` when the value has no such prefix or no home directory can
/// be determined.
pub fn expand_user(s: &str) -> Option<String> {
    if !(s.starts_with("~/") || s.starts_with("~\\")) {
        return None;
    }
    let dirs = directories::UserDirs::new()?;
    let home = dirs.home_dir().to_string_lossy();
    Some(format!("{}{}", home.trim_end_matches('/'), &s[1..]))
}

/// Matches the null sentinels. Expects an already lowercased value.
pub fn is_null_sentinel(lower: &str) -> bool {
    NULL_SENTINELS.contains(&lower)
}

/// Matches the boolean sentinels. Expects an already lowercased value.
pub fn parse_bool(lower: &str) -> Option<bool> {
    if TRUE_SENTINELS.contains(&lower) {
        Some(true)
    } else if FALSE_SENTINELS.contains(&lower) {
        Some(false)
    } else {
        None
    }
}

/// Parse `<number>%` according to `mode`. Always `None` in [`PercentMode::None`].
pub fn parse_percent(s: &str, mode: PercentMode) -> Option<f64> {
    if mode == PercentMode::None {
        return None;
    }
    let num = match parse_number(s.strip_suffix('%')?.trim())? {
        Value::Int(i) => i as f64,
        Value::Float(x) => x,
        _ => return None,
    };
    Some(match mode {
        PercentMode::Fraction => num / 100.0,
        _ => num,
    })
}

/// Parse contiguous `<number><unit>` tokens into total seconds.
///
/// The tokens must cover the whole string with no gaps: `1h30m` matches,
/// `1h 30m` and `1h30mX` do not.
pub fn parse_duration(s: &str) -> Option<f64> {
    let mut pos = 0;
    let mut total = 0.0;
    for caps in DURATION_PART.captures_iter(s) {
        let whole = caps.get(0)?;
        if whole.start() != pos {
            return None;
        }
        let amount: f64 = caps["value"].parse().ok()?;
        total += amount * units::duration_seconds(&caps["unit"])?;
        pos = whole.end();
    }
    (!s.is_empty() && pos == s.len()).then_some(total)
}

/// Parse `<number><optional unit>` into a whole number of bytes.
///
/// A bare number counts as bytes. The product is truncated toward zero; a
/// product outside the `i64` range is not a match.
pub fn parse_bytesize(s: &str) -> Option<i64> {
    let caps = BYTE_SIZE.captures(s)?;
    let num: f64 = caps["num"].parse().ok()?;
    let factor = match caps.name("unit") {
        Some(unit) => units::byte_factor(unit.as_str())?,
        None => 1,
    };
    let bytes = (num * factor as f64).trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (bytes >= i64::MIN as f64 && bytes < i64::MAX as f64).then_some(bytes as i64)
}

/// Parse a numeric literal: `0x`/`0b`/`0o` prefixed integers, then plain
/// integers, then floats with optional exponent.
///
/// A recognized prefix commits the parse: `0xZZ` is no match rather than a
/// retry as something else.
pub fn parse_number(s: &str) -> Option<Value> {
    for (prefixes, radix) in [(["0x", "0X"], 16), (["0b", "0B"], 2), (["0o", "0O"], 8)] {
        if let Some(digits) = prefixes.iter().find_map(|p| s.strip_prefix(p)) {
            return parse_radix(digits, radix).map(Value::Int);
        }
    }
    if INTEGER.is_match(s) {
        // Integers too large for i64 still match the float form below.
        if let Ok(i) = s.parse::<i64>() {
            return Some(Value::Int(i));
        }
    }
    if FLOAT.is_match(s) {
        return s.parse::<f64>().ok().map(Value::Float);
    }
    None
}

/// Digits after a base prefix. Allows a leading underscore and single
/// underscores between digits.
fn parse_radix(digits: &str, radix: u32) -> Option<i64> {
    let digits = digits.trim_end();
    let body = digits.strip_prefix('_').unwrap_or(digits);
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    let cleaned: String = body.chars().filter(|&c| c != '_').collect();
    if !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i64::from_str_radix(&cleaned, radix).ok()
}

/// Parse any JSON document.
pub fn parse_json(s: &str) -> Option<Value> {
    serde_json::from_str::<serde_json::Value>(s)
        .ok()
        .map(Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1.0)
    }

    // --- quotes and escapes ---

    #[test]
    fn strips_matching_double_and_single_quotes() {
        assert_eq!(strip_matching_quotes(r#""hi""#), Some("hi"));
        assert_eq!(strip_matching_quotes("'hi'"), Some("hi"));
        assert_eq!(strip_matching_quotes(r#""""#), Some(""));
    }

    #[test]
    fn mismatched_or_lone_quotes_untouched() {
        assert_eq!(strip_matching_quotes(r#""hi'"#), None);
        assert_eq!(strip_matching_quotes(r#"""#), None);
        assert_eq!(strip_matching_quotes("hi"), None);
    }

    #[test]
    fn unescape_every_sequence() {
        let raw = r#"A\\B\"C\'D\nN\rR\tT\bB\fF\0Z"#;
        assert_eq!(
            unescape_quoted(raw),
            "A\\B\"C'D\nN\rR\tT\u{8}B\u{c}F\0Z"
        );
    }

    #[test]
    fn unescape_applies_pairs_in_sequence() {
        // `\\n` first collapses to `\n`, which the newline pass then rewrites.
        assert_eq!(unescape_quoted(r"a\\nb"), "a\nb");
    }

    // --- home expansion ---

    #[test]
    fn expands_tilde_slash() {
        let Some(home) = directories::UserDirs::new() else {
            return;
        };
        let home = home.home_dir().to_string_lossy().trim_end_matches('/').to_string();
        let out = expand_user("~/myapp/logs.txt").unwrap();
        assert_eq!(out, format!("{home}/myapp/logs.txt"));
    }

    #[test]
    fn expands_tilde_backslash() {
        let Some(home) = directories::UserDirs::new() else {
            return;
        };
        let home = home.home_dir().to_string_lossy().trim_end_matches('/').to_string();
        let out = expand_user(r"~\app\data").unwrap();
        assert_eq!(out, format!(r"{home}\app\data"));
    }

    #[test]
    fn tilde_without_separator_untouched() {
        assert_eq!(expand_user("~user/x"), None);
        assert_eq!(expand_user("a/~/b"), None);
    }

    // --- sentinels ---

    #[test]
    fn sentinels() {
        assert!(is_null_sentinel("undefined"));
        assert!(!is_null_sentinel("nul"));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    // --- percent ---

    #[test]
    fn percent_modes() {
        assert_eq!(parse_percent("50%", PercentMode::Fraction), Some(0.5));
        assert_eq!(parse_percent("50%", PercentMode::Number), Some(50.0));
        assert_eq!(parse_percent("50%", PercentMode::None), None);
        assert_eq!(parse_percent("12.5 %", PercentMode::Number), Some(12.5));
        assert_eq!(parse_percent("abc%", PercentMode::Fraction), None);
        assert_eq!(parse_percent("50", PercentMode::Fraction), None);
    }

    // --- durations ---

    #[test]
    fn duration_each_unit() {
        assert!(approx(parse_duration("1000000000ns").unwrap(), 1.0));
        assert!(approx(parse_duration("250000us").unwrap(), 0.25));
        assert!(approx(parse_duration("1µs").unwrap(), 1e-6));
        assert!(approx(parse_duration("1.5ms").unwrap(), 0.0015));
        assert!(approx(parse_duration("2s").unwrap(), 2.0));
        assert!(approx(parse_duration("1.5m").unwrap(), 90.0));
        assert!(approx(parse_duration("1.5h").unwrap(), 5400.0));
        assert!(approx(parse_duration("2d").unwrap(), 172_800.0));
        assert!(approx(parse_duration("1w").unwrap(), 604_800.0));
    }

    #[test]
    fn duration_composite() {
        assert_eq!(parse_duration("1h30m15s"), Some(5415.0));
        assert_eq!(parse_duration("2d1h"), Some(176_400.0));
    }

    #[test]
    fn duration_requires_contiguity() {
        assert_eq!(parse_duration("1h 30m"), None);
        assert_eq!(parse_duration("1h30mX"), None);
        assert_eq!(parse_duration("X1h"), None);
        assert_eq!(parse_duration("42"), None);
        assert_eq!(parse_duration("1H"), None);
        assert_eq!(parse_duration(""), None);
    }

    // --- byte sizes ---

    #[test]
    fn bytes_si_vs_iec() {
        assert_eq!(parse_bytesize("256MB"), Some(256_000_000));
        assert_eq!(parse_bytesize("256mb"), Some(256 * 1024 * 1024));
        assert_eq!(parse_bytesize("1MiB"), Some(1_048_576));
        assert_eq!(parse_bytesize("2Gb"), Some(2_000_000_000));
        assert_eq!(parse_bytesize("1tB"), Some(1_000_000_000_000));
        assert_eq!(parse_bytesize("1k"), Some(1024));
    }

    #[test]
    fn bytes_whitespace_fraction_and_bare() {
        assert_eq!(parse_bytesize(" 10 KB "), Some(10_000));
        assert_eq!(parse_bytesize("1.5k"), Some(1536));
        assert_eq!(parse_bytesize("42"), Some(42));
        assert_eq!(parse_bytesize("2.9"), Some(2));
        assert_eq!(parse_bytesize("-3b"), Some(-3));
    }

    #[test]
    fn bytes_no_match() {
        assert_eq!(parse_bytesize("0xFF"), None);
        assert_eq!(parse_bytesize("1e-3"), None);
        assert_eq!(parse_bytesize("10 PB"), None);
        assert_eq!(parse_bytesize("MB"), None);
        assert_eq!(parse_bytesize("99999999999999999999"), None);
    }

    // --- numbers ---

    #[test]
    fn prefixed_integers() {
        assert_eq!(parse_number("0xFF"), Some(Value::Int(255)));
        assert_eq!(parse_number("0X2a"), Some(Value::Int(42)));
        assert_eq!(parse_number("0b1010"), Some(Value::Int(10)));
        assert_eq!(parse_number("0o10"), Some(Value::Int(8)));
        assert_eq!(parse_number("0x_ff"), Some(Value::Int(255)));
        assert_eq!(parse_number("0b1_0"), Some(Value::Int(2)));
    }

    #[test]
    fn malformed_prefixed_is_no_match() {
        assert_eq!(parse_number("0xZZ"), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("0b102"), None);
        assert_eq!(parse_number("0x-1"), None);
        assert_eq!(parse_number("0x__1"), None);
        assert_eq!(parse_number("0x1_"), None);
    }

    #[test]
    fn decimal_integers_and_floats() {
        assert_eq!(parse_number("-17"), Some(Value::Int(-17)));
        assert_eq!(parse_number("+5"), Some(Value::Int(5)));
        assert_eq!(parse_number("1e-3"), Some(Value::Float(0.001)));
        assert_eq!(parse_number("1."), Some(Value::Float(1.0)));
        assert_eq!(parse_number(".5"), Some(Value::Float(0.5)));
        assert_eq!(parse_number("2.5E2"), Some(Value::Float(250.0)));
    }

    #[test]
    fn integer_overflow_falls_back_to_float() {
        assert_eq!(
            parse_number("99999999999999999999"),
            Some(Value::Float(1e20))
        );
    }

    #[test]
    fn non_numbers() {
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("."), None);
    }

    // --- json ---

    #[test]
    fn json_documents() {
        let v = parse_json(r#"{"a": 1, "b": true}"#).unwrap();
        assert_eq!(v["a"], Value::Int(1));
        assert_eq!(v["b"], Value::Bool(true));
        assert_eq!(parse_json(r#""text""#), Some(Value::from("text")));
        assert_eq!(parse_json("null"), Some(Value::Null));
        assert_eq!(parse_json("{broken"), None);
    }
}
