use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CastenvError;

/// How `<number>%` values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentMode {
    /// Leave `50%` as a string.
    #[default]
    None,
    /// `50%` becomes `0.5`.
    Fraction,
    /// `50%` becomes `50.0`.
    Number,
}

impl FromStr for PercentMode {
    type Err = CastenvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(PercentMode::None),
            "fraction" => Ok(PercentMode::Fraction),
            "number" => Ok(PercentMode::Number),
            other => Err(CastenvError::InvalidPercentMode(other.to_string())),
        }
    }
}

/// Switches for each stage of [`normalize`](crate::normalize).
///
/// Every stage is independently toggleable. Setters take and return `self`
/// so options chain from [`NormalizeOptions::default()`]:
///
/// ```
/// use castenv::{NormalizeOptions, PercentMode};
///
/// let opts = NormalizeOptions::default()
///     .parse_lists(false)
///     .percent_mode(PercentMode::Fraction);
/// assert!(!opts.parse_lists);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub coerce_empty_to_none: bool,
    pub coerce_null_strings: bool,
    pub parse_booleans: bool,
    pub parse_numbers: bool,
    pub parse_json: bool,
    pub parse_lists: bool,
    pub list_separators: Vec<String>,
    pub strip_quotes: bool,
    pub unescape_in_quotes: bool,
    pub interpolate_env: bool,
    pub expand_user: bool,
    pub parse_duration: bool,
    pub parse_bytesize: bool,
    pub percent_mode: PercentMode,
    pub lowercase_strings: bool,
    /// Allowed values. Checked against the string form of non-null results.
    #[serde(rename = "enum")]
    pub allowed: Option<Vec<String>>,
    /// Deepest container nesting [`normalize_config`](crate::normalize_config) descends into.
    pub max_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            coerce_empty_to_none: true,
            coerce_null_strings: true,
            parse_booleans: true,
            parse_numbers: true,
            parse_json: true,
            parse_lists: true,
            list_separators: vec![",".to_string()],
            strip_quotes: true,
            unescape_in_quotes: true,
            interpolate_env: true,
            expand_user: true,
            parse_duration: true,
            parse_bytesize: true,
            percent_mode: PercentMode::None,
            lowercase_strings: false,
            allowed: None,
            max_depth: 128,
        }
    }
}

impl NormalizeOptions {
    /// Empty strings become `Null` (default: `true`).
    pub fn coerce_empty_to_none(mut self, on: bool) -> Self {
        self.coerce_empty_to_none = on;
        self
    }

    /// `null`, `none`, `nil` and `undefined` become `Null` (default: `true`).
    pub fn coerce_null_strings(mut self, on: bool) -> Self {
        self.coerce_null_strings = on;
        self
    }

    /// Recognize boolean words like `yes` and `off` (default: `true`).
    pub fn parse_booleans(mut self, on: bool) -> Self {
        self.parse_booleans = on;
        self
    }

    /// Parse integers, floats and `0x`/`0b`/`0o` literals (default: `true`).
    pub fn parse_numbers(mut self, on: bool) -> Self {
        self.parse_numbers = on;
        self
    }

    /// Parse JSON objects and arrays (default: `true`).
    pub fn parse_json(mut self, on: bool) -> Self {
        self.parse_json = on;
        self
    }

    /// Split on list separators (default: `true`).
    pub fn parse_lists(mut self, on: bool) -> Self {
        self.parse_lists = on;
        self
    }

    /// Separators tried in order; the first one present in the value splits it
    /// (default: `[","]`).
    pub fn list_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Strip one pair of matching quotes (default: `true`).
    pub fn strip_quotes(mut self, on: bool) -> Self {
        self.strip_quotes = on;
        self
    }

    /// Resolve backslash escapes inside quotes (default: `true`).
    pub fn unescape_in_quotes(mut self, on: bool) -> Self {
        self.unescape_in_quotes = on;
        self
    }

    /// Expand `$NAME` and `${NAME}` references (default: `true`).
    pub fn interpolate_env(mut self, on: bool) -> Self {
        self.interpolate_env = on;
        self
    }

    /// Expand a leading `~/` to the home directory (default: `true`).
    pub fn expand_user(mut self, on: bool) -> Self {
        self.expand_user = on;
        self
    }

    /// Parse durations like `1h30m` into seconds (default: `true`).
    pub fn parse_duration(mut self, on: bool) -> Self {
        self.parse_duration = on;
        self
    }

    /// Parse sizes like `256MB` into bytes (default: `true`).
    pub fn parse_bytesize(mut self, on: bool) -> Self {
        self.parse_bytesize = on;
        self
    }

    /// How `<number>%` is read (default: [`PercentMode::None`]).
    pub fn percent_mode(mut self, mode: PercentMode) -> Self {
        self.percent_mode = mode;
        self
    }

    /// Lowercase string results (default: `false`).
    pub fn lowercase_strings(mut self, on: bool) -> Self {
        self.lowercase_strings = on;
        self
    }

    /// Restrict results to an allow-set (default: none). Violations are errors.
    pub fn allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Deepest nesting `normalize_config` accepts (default: `128`).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Options for the items of a split list: one level of splitting only,
    /// and the allow-set applies to the list as a whole, not its items.
    pub(crate) fn for_list_items(&self) -> Self {
        Self {
            parse_lists: false,
            allowed: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = NormalizeOptions::default();
        assert!(opts.coerce_empty_to_none);
        assert!(opts.parse_lists);
        assert_eq!(opts.list_separators, vec![","]);
        assert_eq!(opts.percent_mode, PercentMode::None);
        assert!(!opts.lowercase_strings);
        assert!(opts.allowed.is_none());
    }

    #[test]
    fn setters_chain() {
        let opts = NormalizeOptions::default()
            .list_separators([";", "|"])
            .allowed(["dev", "prod"])
            .lowercase_strings(true);
        assert_eq!(opts.list_separators, vec![";", "|"]);
        assert_eq!(opts.allowed, Some(vec!["dev".into(), "prod".into()]));
        assert!(opts.lowercase_strings);
    }

    #[test]
    fn list_items_drop_lists_and_enum() {
        let opts = NormalizeOptions::default().allowed(["a"]).parse_numbers(false);
        let items = opts.for_list_items();
        assert!(!items.parse_lists);
        assert!(items.allowed.is_none());
        assert!(!items.parse_numbers);
    }

    #[test]
    fn percent_mode_from_str() {
        assert_eq!("fraction".parse::<PercentMode>().unwrap(), PercentMode::Fraction);
        assert_eq!(" Number ".parse::<PercentMode>().unwrap(), PercentMode::Number);
        assert!(matches!(
            "half".parse::<PercentMode>(),
            Err(CastenvError::InvalidPercentMode(_))
        ));
    }

    #[test]
    fn deserializes_partial_with_defaults() {
        let opts: NormalizeOptions =
            serde_json::from_str(r#"{"percent_mode": "number", "enum": ["x"]}"#).unwrap();
        assert_eq!(opts.percent_mode, PercentMode::Number);
        assert_eq!(opts.allowed, Some(vec!["x".to_string()]));
        assert!(opts.parse_json);
    }
}
