#[cfg(test)]
pub mod test {
    use std::sync::Arc;

    use crate::provider::{MapProvider, ProcessEnv, SharedProvider};

    /// A snapshot process environment holding exactly `pairs`.
    pub fn env(pairs: &[(&str, &str)]) -> ProcessEnv {
        ProcessEnv::from_vars(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    /// A dotenv-style layer holding exactly `pairs`.
    pub fn dotenv(pairs: &[(&str, &str)]) -> SharedProvider {
        Arc::new(pairs.iter().copied().collect::<MapProvider>())
    }

    #[test]
    fn fixtures_hold_pairs() {
        use crate::provider::StringProvider;

        assert_eq!(env(&[("A", "1")]).lookup("A").as_deref(), Some("1"));
        assert_eq!(dotenv(&[("B", "2")]).lookup("B").as_deref(), Some("2"));
        assert_eq!(env(&[]).lookup("A"), None);
    }
}
