//! The normalization pipeline.
//!
//! [`normalize_with`] turns one raw value into a typed [`Value`]. Strings run
//! through a fixed chain of stages; the first stage that matches wins:
//!
//! 1. trim, then interpolate `$` references
//! 2. empty → `Null` or `""`
//! 3. strip matching quotes (unescaping inside them)
//! 4. expand a leading `~/`
//! 5. null sentinels (`null`, `none`, `nil`, `undefined`)
//! 6. boolean sentinels (`true`/`yes`/`y`/`on`/`1` and their opposites)
//! 7. percentages (when a percent mode is set)
//! 8. durations (`1h30m` → seconds)
//! 9. byte sizes (`256MB` → bytes)
//! 10. numbers (hex, binary, octal, integer, float)
//! 11. JSON (bracket-prefixed, or anything that was quoted)
//! 12. lists (split on the first separator present, one level deep)
//! 13. the string itself
//!
//! The order is the precedence: `"1"` is `true` rather than `1` while booleans
//! are enabled, and `"30s"` is a duration rather than an unparseable number.
//!
//! Non-string values pass through untouched, which lets typed defaults skip
//! parsing entirely. [`normalize_config_with`] applies the same pipeline to
//! every string leaf of a nested structure.

use tracing::trace;

use crate::error::CastenvError;
use crate::interpolate::interpolate;
use crate::options::NormalizeOptions;
use crate::provider::{ProcessEnv, StringProvider};
use crate::scalar;
use crate::value::Value;

/// Normalize `value`, resolving `$` references against the live process
/// environment.
pub fn normalize(value: impl Into<Value>, options: &NormalizeOptions) -> Result<Value, CastenvError> {
    normalize_with(value, options, &ProcessEnv::Live)
}

/// Normalize `value`, resolving `$` references through `provider`.
///
/// Fails only when the options carry an allow-set and the result is not in it.
pub fn normalize_with(
    value: impl Into<Value>,
    options: &NormalizeOptions,
    provider: &dyn StringProvider,
) -> Result<Value, CastenvError> {
    let result = match value.into() {
        Value::Null => Value::Null,
        Value::String(raw) => normalize_str(&raw, options, provider),
        other => return Ok(other),
    };

    check_allowed(lowercase(result, options), options)
}

fn lowercase(value: Value, options: &NormalizeOptions) -> Value {
    match value {
        Value::String(s) if options.lowercase_strings => Value::String(s.to_lowercase()),
        other => other,
    }
}

fn check_allowed(result: Value, options: &NormalizeOptions) -> Result<Value, CastenvError> {
    let Some(allowed) = &options.allowed else {
        return Ok(result);
    };
    if result.is_null() {
        return Ok(result);
    }
    let rendered = match &result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if allowed.contains(&rendered) {
        Ok(result)
    } else {
        Err(CastenvError::NotInEnum {
            value: rendered,
            allowed: allowed.clone(),
        })
    }
}

fn empty(options: &NormalizeOptions) -> Value {
    if options.coerce_empty_to_none {
        Value::Null
    } else {
        Value::String(String::new())
    }
}

fn normalize_str(raw: &str, options: &NormalizeOptions, provider: &dyn StringProvider) -> Value {
    let trimmed = raw.trim();
    let mut s = if options.interpolate_env && trimmed.contains('$') {
        interpolate(trimmed, provider)
    } else {
        trimmed.to_string()
    };
    if s.is_empty() {
        return empty(options);
    }

    let mut was_quoted = false;
    if options.strip_quotes
        && let Some(inner) = scalar::strip_matching_quotes(&s)
    {
        was_quoted = true;
        s = if options.unescape_in_quotes {
            scalar::unescape_quoted(inner)
        } else {
            inner.to_string()
        };
    }

    if options.expand_user
        && let Some(expanded) = scalar::expand_user(&s)
    {
        s = expanded;
    }

    if let Some(value) = match_scalar(&s, options) {
        return value;
    }

    if options.parse_json && (s.starts_with('{') || s.starts_with('[') || was_quoted) {
        // Quoted values are parsed as written, quotes and escapes included.
        let text = if was_quoted { trimmed } else { s.as_str() };
        if let Some(value) = scalar::parse_json(text) {
            trace!(stage = "json", "matched");
            return value;
        }
    }

    if options.parse_lists
        && let Some(sep) = options
            .list_separators
            .iter()
            .find(|sep| !sep.is_empty() && s.contains(sep.as_str()))
    {
        trace!(stage = "list", separator = %sep, "matched");
        let item_options = options.for_list_items();
        let items = s
            .split(sep.as_str())
            .map(|part| lowercase(normalize_str(part, &item_options, provider), &item_options))
            .collect();
        return Value::List(items);
    }

    Value::String(s)
}

/// Stages 5 through 10: sentinels, percentages, durations, sizes, numbers.
fn match_scalar(s: &str, options: &NormalizeOptions) -> Option<Value> {
    let lower = s.to_lowercase();

    if options.coerce_null_strings && scalar::is_null_sentinel(&lower) {
        trace!(stage = "null", "matched");
        return Some(Value::Null);
    }
    if options.parse_booleans
        && let Some(b) = scalar::parse_bool(&lower)
    {
        trace!(stage = "bool", "matched");
        return Some(Value::Bool(b));
    }
    if let Some(pct) = scalar::parse_percent(s, options.percent_mode) {
        trace!(stage = "percent", "matched");
        return Some(Value::Float(pct));
    }
    if options.parse_duration
        && let Some(secs) = scalar::parse_duration(s)
    {
        trace!(stage = "duration", "matched");
        return Some(Value::Float(secs));
    }
    if options.parse_bytesize
        && let Some(bytes) = scalar::parse_bytesize(s)
    {
        trace!(stage = "bytesize", "matched");
        return Some(Value::Int(bytes));
    }
    if options.parse_numbers
        && let Some(num) = scalar::parse_number(s)
    {
        trace!(stage = "number", "matched");
        return Some(num);
    }
    None
}

/// Normalize every string leaf of `value`, resolving `$` references against
/// the live process environment.
pub fn normalize_config(value: Value, options: &NormalizeOptions) -> Result<Value, CastenvError> {
    normalize_config_with(value, options, &ProcessEnv::Live)
}

/// Normalize every string leaf of `value`, resolving `$` references through
/// `provider`.
///
/// Maps keep their keys and lists their order; non-string leaves are returned
/// unchanged. Each string is expanded exactly once, regardless of
/// `options.interpolate_env`, and then normalized.
/// Nesting deeper than `options.max_depth` is an error.
pub fn normalize_config_with(
    value: Value,
    options: &NormalizeOptions,
    provider: &dyn StringProvider,
) -> Result<Value, CastenvError> {
    // Expansion happens here, so the leaf pipeline must not expand again.
    let leaf_options = NormalizeOptions {
        interpolate_env: false,
        ..options.clone()
    };
    walk(value, options, &leaf_options, provider, 0)
}

fn walk(
    value: Value,
    options: &NormalizeOptions,
    leaf_options: &NormalizeOptions,
    provider: &dyn StringProvider,
    depth: usize,
) -> Result<Value, CastenvError> {
    match value {
        Value::Map(map) => {
            let depth = descend(depth, options)?;
            map.into_iter()
                .map(|(k, v)| walk(v, options, leaf_options, provider, depth).map(|v| (k, v)))
                .collect::<Result<_, _>>()
                .map(Value::Map)
        }
        Value::List(items) => {
            let depth = descend(depth, options)?;
            items
                .into_iter()
                .map(|v| walk(v, options, leaf_options, provider, depth))
                .collect::<Result<_, _>>()
                .map(Value::List)
        }
        Value::String(s) => normalize_with(interpolate(&s, provider), leaf_options, provider),
        other => Ok(other),
    }
}

fn descend(depth: usize, options: &NormalizeOptions) -> Result<usize, CastenvError> {
    if depth >= options.max_depth {
        return Err(CastenvError::NestingTooDeep {
            limit: options.max_depth,
        });
    }
    Ok(depth + 1)
}
