//! Key normalization provider for Figment.
//!
//! Every settings layer goes through [`CanonicalKeys`], so `skip_ci`,
//! `SKIPCI` and `skipCI` all land on the same key and later layers override
//! earlier ones instead of colliding during extraction.

use figment::{
    Error, Metadata, Profile, Provider,
    value::{Dict, Map},
};

/// Wraps a provider and rewrites its top-level keys to their canonical spelling
pub struct CanonicalKeys<P> {
    inner: P,
}

impl<P> CanonicalKeys<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Provider> Provider for CanonicalKeys<P> {
    fn metadata(&self) -> Metadata {
        self.inner.metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let data = self.inner.data()?;
        Ok(data
            .into_iter()
            .map(|(profile, dict)| {
                let dict = dict
                    .into_iter()
                    .map(|(key, value)| (canonical_key(&key), value))
                    .collect();
                (profile, dict)
            })
            .collect())
    }
}

/// Canonical spelling of a settings key, ignoring case, `_` and `-`
pub fn canonical_key(key: &str) -> String {
    let folded: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    match folded.as_str() {
        "skipci" => "skipCI".to_string(),
        "skiponbranches" => "skipOnBranches".to_string(),
        _ => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Json};

    #[test]
    fn test_canonical_key_spellings() {
        for key in ["skipCI", "skip_ci", "skipci", "SKIP_CI", "skip-ci"] {
            assert_eq!(canonical_key(key), "skipCI");
        }
        for key in ["skipOnBranches", "skip_on_branches", "skiponbranches"] {
            assert_eq!(canonical_key(key), "skipOnBranches");
        }
        assert_eq!(canonical_key("timeout"), "timeout");
        assert_eq!(canonical_key("commands"), "commands");
    }

    #[test]
    fn test_provider_rewrites_top_level_keys() {
        let json = Json::string(r#"{ "skip_on_branches": ["main"], "timeout": 10 }"#);
        let data = CanonicalKeys::new(json).data().unwrap();
        let dict = &data[&Profile::Default];

        assert!(dict.contains_key("skipOnBranches"));
        assert!(!dict.contains_key("skip_on_branches"));
        assert!(dict.contains_key("timeout"));
    }
}
