//! Turn loosely written configuration strings into typed values.
//!
//! Environment variables, `.env` entries and config-file leaves all arrive as
//! text. Castenv normalizes that text into a [`Value`]: booleans, integers in
//! any common base, floats, durations in seconds, byte sizes, percentages,
//! JSON documents and delimited lists, with `${VAR}` interpolation and `~/`
//! expansion on the way.
//!
//! ```ignore
//! let ctx = Castenv::builder().build();
//! let timeout = ctx.get_env("TIMEOUT", "30s")?;   // Value::Float(30.0)
//! let port = ctx.env_int("PORT", Some(8080))?;    // Some(8080)
//! ```
//!
//! # The normalization pipeline
//!
//! A string is trimmed, then interpolated when it contains `$`. It is then
//! tried against each enabled stage, first match wins:
//!
//! 1. empty string → `Null` (or `""`)
//! 2. matching quotes are stripped and escape sequences resolved
//! 3. a leading `~/` becomes the home directory
//! 4. null sentinels (`null`, `none`, `nil`, `undefined`)
//! 5. boolean sentinels (`true`/`false`, `yes`/`no`, `on`/`off`, `1`/`0`, ...)
//! 6. percentages, when a [`PercentMode`] asks for them
//! 7. durations (`1h30m`, `250ms`) in seconds
//! 8. byte sizes (`256MB` in SI, `1MiB` or `10mb` in IEC)
//! 9. numbers: `0x`/`0b`/`0o` prefixes, integers, floats
//! 10. JSON objects and arrays, or any value that was quoted
//! 11. lists, split on the first separator present, each item normalized
//!     without further splitting
//!
//! Anything left over is returned as the string itself, lowercased when
//! asked, and finally checked against an allowed set if one is configured.
//! Every stage is switchable through [`NormalizeOptions`].
//!
//! # Sources
//!
//! Raw strings come from a [`StringProvider`]. [`Sources`] layers the usual
//! providers:
//!
//! ```text
//! Overlay               any third-party provider, when enabled
//!        ↓ falls through to
//! Process environment   when prefer_os_over_dotenv and the key is set
//!        ↓ falls through to
//! Dotenv mapping        merged .env values supplied by the host
//!        ↓ falls through to
//! Process environment
//! ```
//!
//! [`ProcessEnv`] reads the live environment or a snapshot, and
//! [`MapProvider`] covers any in-memory mapping.
//!
//! # Context
//!
//! [`Castenv`] pairs a [`Sources`] with default options. It is plain data:
//! build one, clone it, pass it around. [`Castenv::using`] applies temporary
//! [`Overrides`] for a scope and restores the previous state when the guard
//! drops.
//!
//! # Nested configuration
//!
//! [`normalize_config`] walks a nested [`Value`] and normalizes every string
//! leaf, expanding each one exactly once through the provider. Parsed TOML or
//! JSON documents convert into [`Value`] with `From`.
//!
//! # Cargo features
//!
//! - **`toml`** (default): `From` conversions for `toml::Value` and
//!   `toml::Table`.

pub mod error;

mod context;
mod interpolate;
mod normalize;
mod options;
mod provider;
mod scalar;
mod units;
mod value;

#[cfg(test)]
mod fixtures;

pub use context::{Castenv, CastenvBuilder, Overrides, Scoped};
pub use error::CastenvError;
pub use interpolate::interpolate;
pub use normalize::{normalize, normalize_config, normalize_config_with, normalize_with};
pub use options::{NormalizeOptions, PercentMode};
pub use provider::{MapProvider, ProcessEnv, SharedProvider, SourceSettings, Sources, StringProvider};
pub use value::Value;
