//! `${NAME}`, `${NAME:-default}` and `$NAME` expansion.
//!
//! Names follow identifier syntax (a letter or underscore, then letters,
//! digits or underscores). Each reference is looked up once through a
//! [`StringProvider`]:
//!
//! | Reference | Found | Not found |
//! |-----------|-------|-----------|
//! | `${NAME}` | raw value | empty string |
//! | `${NAME:-dflt}` | raw value | `dflt`, verbatim |
//! | `$NAME` | raw value | empty string |
//!
//! Expansion is a single left-to-right pass. Substituted text is never
//! rescanned, so a value containing `$OTHER` stays literal.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::provider::StringProvider;

static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?::-(?P<default>[^}]*))?\}|\$(?P<short>[A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("variable reference pattern is valid")
});

/// Expand every variable reference in `s` using `provider`.
pub fn interpolate(s: &str, provider: &dyn StringProvider) -> String {
    VAR_REF
        .replace_all(s, |caps: &Captures| {
            if let Some(name) = caps.name("name") {
                let name = name.as_str();
                provider.lookup(name).unwrap_or_else(|| match caps.name("default") {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        debug!(var = name, "unresolved reference expands to empty");
                        String::new()
                    }
                })
            } else {
                let name = caps.name("short").map_or("", |m| m.as_str());
                provider.lookup(name).unwrap_or_else(|| {
                    debug!(var = name, "unresolved reference expands to empty");
                    String::new()
                })
            }
        })
        .into_owned()
}
