//! Raw string sources and their layering.
//!
//! The normalization engine only ever asks one question of the outside world:
//! "what is the raw string for this name, if any?" That question is the
//! [`StringProvider`] trait. [`Sources`] composes the usual layers:
//!
//! ```text
//! Process environment   (when prefer_os_over_dotenv and the key is set)
//!        ↓ falls through to
//! Dotenv mapping        merged .env values supplied by the host
//!        ↓ falls through to
//! Process environment
//! ```
//!
//! An optional overlay layer (any third-party config provider) sits above all
//! of them when enabled. Reading and merging `.env` files is the host's job;
//! the result is handed in as a [`MapProvider`] or any other provider.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

/// A lookup from variable name to raw string.
pub trait StringProvider {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<T: StringProvider + ?Sized> StringProvider for &T {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

impl<T: StringProvider + ?Sized> StringProvider for Box<T> {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

impl<T: StringProvider + ?Sized> StringProvider for Arc<T> {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

/// A shareable provider layer.
pub type SharedProvider = Arc<dyn StringProvider + Send + Sync>;

/// The process environment, read live or from a snapshot.
///
/// Snapshots let tests supply synthetic variables instead of mutating the real
/// environment.
#[derive(Debug, Clone, Default)]
pub enum ProcessEnv {
    #[default]
    Live,
    Snapshot(HashMap<String, String>),
}

impl ProcessEnv {
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        ProcessEnv::Snapshot(vars.into_iter().collect())
    }

    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars())
    }
}

impl StringProvider for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        match self {
            ProcessEnv::Live => std::env::var(name).ok(),
            ProcessEnv::Snapshot(vars) => vars.get(name).cloned(),
        }
    }
}

/// An in-memory key to string mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapProvider {
    values: HashMap<String, String>,
}

impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapProvider {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl StringProvider for MapProvider {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// The knobs of [`Sources`] that scoped overrides can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSettings {
    /// A variable set in the process environment beats the dotenv layer.
    pub prefer_os_over_dotenv: bool,
    /// Consult the overlay layer first, when one is configured.
    pub use_overlay: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            prefer_os_over_dotenv: true,
            use_overlay: true,
        }
    }
}

/// The layered provider: overlay, then dotenv and process environment in the
/// order [`SourceSettings`] selects.
#[derive(Clone, Default)]
pub struct Sources {
    pub(crate) overlay: Option<SharedProvider>,
    pub(crate) dotenv: Option<SharedProvider>,
    pub(crate) env: ProcessEnv,
    pub(crate) settings: SourceSettings,
}

impl Sources {
    pub fn new(env: ProcessEnv) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    pub fn with_overlay(mut self, overlay: SharedProvider) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_dotenv(mut self, dotenv: SharedProvider) -> Self {
        self.dotenv = Some(dotenv);
        self
    }

    pub fn with_settings(mut self, settings: SourceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> SourceSettings {
        self.settings
    }
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources")
            .field("overlay", &self.overlay.is_some())
            .field("dotenv", &self.dotenv.is_some())
            .field("env", &self.env)
            .field("settings", &self.settings)
            .finish()
    }
}

impl StringProvider for Sources {
    fn lookup(&self, name: &str) -> Option<String> {
        if self.settings.use_overlay
            && let Some(overlay) = &self.overlay
            && let Some(value) = overlay.lookup(name)
        {
            debug!(var = name, layer = "overlay", "resolved variable");
            return Some(value);
        }

        if self.settings.prefer_os_over_dotenv
            && let Some(value) = self.env.lookup(name)
        {
            debug!(var = name, layer = "env", "resolved variable");
            return Some(value);
        }

        if let Some(dotenv) = &self.dotenv
            && let Some(value) = dotenv.lookup(name)
        {
            debug!(var = name, layer = "dotenv", "resolved variable");
            return Some(value);
        }

        let value = self.env.lookup(name);
        if value.is_some() {
            debug!(var = name, layer = "env", "resolved variable");
        }
        value
    }
}
