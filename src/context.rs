//! The configuration context and its convenience casts.
//!
//! [`Castenv`] bundles the layered [`Sources`] with default
//! [`NormalizeOptions`]. It is an ordinary value: build one at startup and
//! pass it where it is needed. [`Castenv::using`] swaps in temporary
//! overrides and puts the previous state back when the guard drops.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use crate::error::CastenvError;
use crate::normalize::{normalize_config_with, normalize_with};
use crate::options::NormalizeOptions;
use crate::provider::{ProcessEnv, SharedProvider, SourceSettings, Sources, StringProvider};
use crate::scalar;
use crate::value::Value;

/// Entry point for reading and normalizing configuration values.
#[derive(Debug, Clone, Default)]
pub struct Castenv {
    sources: Sources,
    options: NormalizeOptions,
}

impl Castenv {
    pub fn builder() -> CastenvBuilder {
        CastenvBuilder::default()
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// The raw string for `key` from the layered sources, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.sources.lookup(key)
    }

    /// Temporarily apply `overrides`. The returned guard derefs to the
    /// overridden context and restores the previous one when dropped,
    /// including while unwinding.
    pub fn using(&mut self, overrides: Overrides) -> Scoped<'_> {
        let saved = self.clone();
        overrides.apply(self);
        Scoped {
            ctx: self,
            saved: Some(saved),
        }
    }

    /// Look up `key` and normalize it with the context's options. When the
    /// key is absent, `default` is normalized instead; non-string defaults
    /// come back unchanged.
    pub fn get_env(&self, key: &str, default: impl Into<Value>) -> Result<Value, CastenvError> {
        self.get_env_with(key, default, &self.options)
    }

    pub fn get_env_with(
        &self,
        key: &str,
        default: impl Into<Value>,
        options: &NormalizeOptions,
    ) -> Result<Value, CastenvError> {
        let raw = match self.raw(key) {
            Some(s) => Value::String(s),
            None => default.into(),
        };
        normalize_with(raw, options, &self.sources)
    }

    /// [`get_env`](Self::get_env) for each key, with per-key defaults.
    pub fn get_all<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
        defaults: &BTreeMap<String, Value>,
    ) -> Result<BTreeMap<String, Value>, CastenvError> {
        keys.into_iter()
            .map(|key| {
                let default = defaults.get(key).cloned().unwrap_or_default();
                Ok((key.to_string(), self.get_env(key, default)?))
            })
            .collect()
    }

    /// The value's string form, or `None` when it normalizes to null.
    pub fn env_str(&self, key: &str, default: Option<&str>) -> Result<Option<String>, CastenvError> {
        let value = self.get_env(key, default)?;
        Ok((!value.is_null()).then(|| value.to_string()))
    }

    /// Read `key` as a boolean sentinel. Anything else is a `Coerce` error.
    pub fn env_bool(&self, key: &str, default: Option<bool>) -> Result<Option<bool>, CastenvError> {
        let default = default.map(|b| b.to_string());
        match self.get_env(key, default)? {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            other => {
                let rendered = other.to_string().trim().to_lowercase();
                scalar::parse_bool(&rendered)
                    .map(Some)
                    .ok_or_else(|| CastenvError::coerce(&other, "bool"))
            }
        }
    }

    /// Read `key` as an `i64`. Booleans map to 0/1 and integral floats inside
    /// the `i64` range convert; anything else is a `Coerce` error.
    pub fn env_int(&self, key: &str, default: Option<i64>) -> Result<Option<i64>, CastenvError> {
        let default = default.map(|i| i.to_string());
        match self.get_env(key, default)? {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(i)),
            Value::Bool(b) => Ok(Some(i64::from(b))),
            // i64::MAX as f64 rounds up to 2^63, which is already out of range.
            Value::Float(x) if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 => {
                Ok(Some(x as i64))
            }
            other => other
                .to_string()
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| CastenvError::coerce(&other, "int")),
        }
    }

    /// Read `key` as an `f64`. The default is used as given.
    pub fn env_float(&self, key: &str, default: Option<f64>) -> Result<Option<f64>, CastenvError> {
        // Rendering would send "1.5" through bytesize, which truncates.
        match self.get_env(key, default)? {
            Value::Null => Ok(None),
            Value::Float(x) => Ok(Some(x)),
            Value::Int(i) => Ok(Some(i as f64)),
            Value::Bool(b) => Ok(Some(if b { 1.0 } else { 0.0 })),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| CastenvError::coerce(&s, "float")),
            other => Err(CastenvError::coerce(&other, "float")),
        }
    }

    /// Read `key` as a list split on `separators`. A value that does not
    /// split comes back as a one-element list.
    pub fn env_list<S: AsRef<str>>(
        &self,
        key: &str,
        default: Option<&str>,
        separators: &[S],
    ) -> Result<Option<Vec<Value>>, CastenvError> {
        let options = self
            .options
            .clone()
            .parse_lists(true)
            .list_separators(separators.iter().map(|s| s.as_ref().to_string()));
        match self.get_env_with(key, default, &options)? {
            Value::Null => Ok(None),
            Value::List(items) => Ok(Some(items)),
            other => Ok(Some(vec![other])),
        }
    }

    /// Normalize a single value, resolving `$` references through the
    /// context's sources.
    pub fn normalize(&self, value: impl Into<Value>) -> Result<Value, CastenvError> {
        normalize_with(value, &self.options, &self.sources)
    }

    /// Normalize every string leaf of a nested value through the context's
    /// sources.
    pub fn normalize_config(&self, value: Value) -> Result<Value, CastenvError> {
        normalize_config_with(value, &self.options, &self.sources)
    }
}

/// Builder for [`Castenv`].
#[derive(Default)]
pub struct CastenvBuilder {
    env: Option<ProcessEnv>,
    overlay: Option<SharedProvider>,
    dotenv: Option<SharedProvider>,
    settings: SourceSettings,
    options: NormalizeOptions,
}

impl CastenvBuilder {
    /// Process environment to read (default: live).
    pub fn env(mut self, env: ProcessEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// A third-party provider consulted before everything else.
    pub fn overlay(mut self, provider: SharedProvider) -> Self {
        self.overlay = Some(provider);
        self
    }

    /// The merged `.env` mapping.
    pub fn dotenv(mut self, provider: SharedProvider) -> Self {
        self.dotenv = Some(provider);
        self
    }

    /// Whether a set process variable beats the dotenv layer (default: `true`).
    pub fn prefer_os_over_dotenv(mut self, on: bool) -> Self {
        self.settings.prefer_os_over_dotenv = on;
        self
    }

    /// Whether the overlay layer is consulted (default: `true`).
    pub fn use_overlay(mut self, on: bool) -> Self {
        self.settings.use_overlay = on;
        self
    }

    /// Default options for every lookup.
    pub fn options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Castenv {
        let mut sources = Sources::new(self.env.unwrap_or_default()).with_settings(self.settings);
        sources.overlay = self.overlay;
        sources.dotenv = self.dotenv;
        Castenv {
            sources,
            options: self.options,
        }
    }
}

/// Temporary changes applied by [`Castenv::using`]. Unset fields keep their
/// current value.
#[derive(Default)]
pub struct Overrides {
    dotenv: Option<SharedProvider>,
    prefer_os_over_dotenv: Option<bool>,
    use_overlay: Option<bool>,
    options: Option<NormalizeOptions>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dotenv(mut self, provider: SharedProvider) -> Self {
        self.dotenv = Some(provider);
        self
    }

    pub fn prefer_os_over_dotenv(mut self, on: bool) -> Self {
        self.prefer_os_over_dotenv = Some(on);
        self
    }

    pub fn use_overlay(mut self, on: bool) -> Self {
        self.use_overlay = Some(on);
        self
    }

    pub fn options(mut self, options: NormalizeOptions) -> Self {
        self.options = Some(options);
        self
    }

    fn apply(self, ctx: &mut Castenv) {
        if let Some(dotenv) = self.dotenv {
            ctx.sources.dotenv = Some(dotenv);
        }
        if let Some(on) = self.prefer_os_over_dotenv {
            ctx.sources.settings.prefer_os_over_dotenv = on;
        }
        if let Some(on) = self.use_overlay {
            ctx.sources.settings.use_overlay = on;
        }
        if let Some(options) = self.options {
            ctx.options = options;
        }
    }
}

/// Guard returned by [`Castenv::using`].
pub struct Scoped<'a> {
    ctx: &'a mut Castenv,
    saved: Option<Castenv>,
}

impl Deref for Scoped<'_> {
    type Target = Castenv;

    fn deref(&self) -> &Castenv {
        &*self.ctx
    }
}

impl DerefMut for Scoped<'_> {
    fn deref_mut(&mut self) -> &mut Castenv {
        &mut *self.ctx
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.ctx = saved;
        }
    }
}
