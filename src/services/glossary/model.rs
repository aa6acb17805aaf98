use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::entry::{GlossaryEntry, GlossaryTerm};
use crate::model::locale::LocaleId;

/// A glossary entry as kept in the store. Terms are keyed by locale:
/// one term per (entry, locale) pair, the source locale included.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredGlossaryEntry {
    pub id: u64,

    pub src_locale: LocaleId,

    #[serde(default)]
    pub source_ref: Option<String>,

    #[serde(default)]
    pub pos: String,

    #[serde(default)]
    pub description: String,

    pub content_hash: String,

    #[serde(default)]
    pub terms: BTreeMap<LocaleId, StoredGlossaryTerm>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredGlossaryTerm {
    pub content: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub last_modified_by: Option<String>,
}

impl StoredGlossaryEntry {
    /// Wire representation of this entry, terms ordered by locale with
    /// the source term first.
    pub fn to_dto(&self) -> GlossaryEntry {
        let mut terms: Vec<GlossaryTerm> = Vec::with_capacity(self.terms.len());
        if let Some(src) = self.terms.get(&self.src_locale) {
            terms.push(term_dto(&self.src_locale, src));
        }
        for (locale, term) in &self.terms {
            if locale != &self.src_locale {
                terms.push(term_dto(locale, term));
            }
        }

        GlossaryEntry {
            id: Some(self.id),
            src_lang: self.src_locale.clone(),
            pos: self.pos.clone(),
            description: self.description.clone(),
            source_reference: self.source_ref.clone(),
            glossary_terms: terms,
        }
    }
}

fn term_dto(locale: &LocaleId, term: &StoredGlossaryTerm) -> GlossaryTerm {
    GlossaryTerm {
        locale: locale.clone(),
        content: term.content.clone(),
        comment: term.comment.clone(),
    }
}
