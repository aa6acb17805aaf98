use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::model::locale::LocaleId;

const LOCALES_FILE: &str = "locales.json";

/// Locales a platform instance accepts translations for. Terms in any
/// other locale are dropped by the import pipeline.
pub struct LocaleRegistry {
    enabled: BTreeSet<LocaleId>,
}

impl LocaleRegistry {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LocaleRegistry {
            enabled: codes
                .into_iter()
                .map(|c| LocaleId::new(c.into()))
                .collect(),
        }
    }

    /// Registry from the instance config file next to the store, or the
    /// built-in defaults when there is none. An unreadable file falls
    /// back to the defaults as well.
    pub fn load_default() -> Self {
        Self::load(Path::new(LOCALES_FILE))
    }

    pub fn load(path: &Path) -> Self {
        if let Ok(data) = fs::read_to_string(path) {
            if let Ok(codes) = serde_json::from_str::<Vec<String>>(&data) {
                return Self::from_codes(codes);
            }
            tracing::warn!("ignoring malformed locale config {}", path.display());
        }
        Self::defaults()
    }

    pub fn defaults() -> Self {
        Self::from_codes([
            "en", "en-US", "de", "es", "fr", "it", "ja", "ko", "pt-BR", "ru", "zh-CN",
        ])
    }

    pub fn get(&self, locale: &LocaleId) -> Option<&LocaleId> {
        self.enabled.get(locale)
    }

    pub fn codes(&self) -> Vec<String> {
        self.enabled.iter().map(|l| l.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_codes_are_enabled() {
        let registry = LocaleRegistry::from_codes(["en-US", "hi"]);
        assert!(registry.get(&LocaleId::from("hi")).is_some());
        assert!(registry.get(&LocaleId::from("de")).is_none());
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let registry = LocaleRegistry::load(Path::new("does-not-exist.json"));
        assert!(registry.get(&LocaleId::from("en-US")).is_some());
    }

    #[test]
    fn codes_are_sorted() {
        let registry = LocaleRegistry::from_codes(["fr", "de", "ja"]);
        assert_eq!(registry.codes(), vec!["de", "fr", "ja"]);
    }
}
