use thiserror::Error;

#[derive(Debug, Error)]
pub enum CastenvError {
    #[error("Value '{value}' not in allowed set {allowed:?}")]
    NotInEnum { value: String, allowed: Vec<String> },

    #[error("Cannot coerce '{value}' to {target}")]
    Coerce { value: String, target: &'static str },

    #[error("Unknown percent mode '{0}' (expected none, fraction or number)")]
    InvalidPercentMode(String),

    #[error("Config nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
}

impl CastenvError {
    pub(crate) fn coerce(value: impl ToString, target: &'static str) -> Self {
        Self::Coerce {
            value: value.to_string(),
            target,
        }
    }
}
