use sha2::{Digest, Sha256};

use crate::model::entry::GlossaryEntry;
use crate::model::locale::LocaleId;

/// Dedup key for a glossary entry: hash of source locale, source-term
/// content, part-of-speech and description. Fields are separated so
/// adjacent fields cannot collide by concatenation.
pub fn content_hash(src_locale: &LocaleId, content: &str, pos: &str, description: &str) -> String {
    let mut hasher = Sha256::new();
    for field in [src_locale.as_str(), content, pos, description] {
        hasher.update(field.as_bytes());
        hasher.update(b"|");
    }
    hex::encode(hasher.finalize())
}

pub fn of_entry(entry: &GlossaryEntry) -> String {
    let content = entry.src_term().map(|t| t.content.as_str()).unwrap_or("");
    content_hash(&entry.src_lang, content, &entry.pos, &entry.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let locale = LocaleId::from("en-US");
        let a = content_hash(&locale, "house", "noun", "a building");
        let b = content_hash(&locale, "house", "noun", "a building");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_covers_every_field() {
        let locale = LocaleId::from("en-US");
        let base = content_hash(&locale, "house", "noun", "a building");
        assert_ne!(base, content_hash(&LocaleId::from("de"), "house", "noun", "a building"));
        assert_ne!(base, content_hash(&locale, "home", "noun", "a building"));
        assert_ne!(base, content_hash(&locale, "house", "verb", "a building"));
        assert_ne!(base, content_hash(&locale, "house", "noun", "a dwelling"));
    }

    #[test]
    fn field_boundaries_do_not_collide() {
        let locale = LocaleId::from("en");
        assert_ne!(
            content_hash(&locale, "ab", "c", ""),
            content_hash(&locale, "a", "bc", "")
        );
    }
}
