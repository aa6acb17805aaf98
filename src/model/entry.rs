use serde::{Deserialize, Serialize};

use crate::model::locale::LocaleId;

/// One glossary entry as it travels over the wire: the source term plus
/// its translations, part-of-speech and description.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlossaryEntry {
    /// Stable id of an already-stored entry, when the client knows it.
    #[serde(default)]
    pub id: Option<u64>,

    pub src_lang: LocaleId,

    #[serde(default)]
    pub pos: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub source_reference: Option<String>,

    /// One term per locale, the source locale included.
    #[serde(default)]
    pub glossary_terms: Vec<GlossaryTerm>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlossaryTerm {
    pub locale: LocaleId,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub comment: Option<String>,
}

impl GlossaryEntry {
    /// The term whose locale matches the entry's source locale.
    pub fn src_term(&self) -> Option<&GlossaryTerm> {
        self.glossary_terms
            .iter()
            .find(|t| t.locale == self.src_lang)
    }
}
