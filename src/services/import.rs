use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ServiceError;
use crate::model::entry::GlossaryEntry;
use crate::model::locale::LocaleId;
use crate::parsers;
use crate::services::glossary::hash;
use crate::services::glossary::model::{StoredGlossaryEntry, StoredGlossaryTerm};
use crate::services::glossary::store::GlossaryStore;
use crate::services::locales::LocaleRegistry;

/// The store is flushed and its unit-of-work cache cleared after this
/// many processed entries, so large imports stay bounded in memory.
pub const BATCH_SIZE: usize = 50;

/// Cap on the stored `pos` and `description` columns.
pub const MAX_FIELD_LENGTH: usize = 255;

pub struct ImportContext<'a> {
    pub store: &'a mut GlossaryStore,
    pub locales: &'a LocaleRegistry,
    /// Authenticated user, recorded as the last modifier of every term
    /// the import touches.
    pub username: Option<&'a str>,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub entry_ids: Vec<u64>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    fn merge(&mut self, other: ImportReport) {
        self.entry_ids.extend(other.entry_ids);
        self.warnings.extend(other.warnings);
    }
}

/// Parse an uploaded glossary file and upsert everything it contains.
pub fn import_file(
    ctx: &mut ImportContext,
    bytes: &[u8],
    file_name: &str,
    src_lang: &LocaleId,
    trans_lang: Option<&LocaleId>,
) -> Result<ImportReport, ServiceError> {
    let batches = parsers::parse_glossary_file(bytes, file_name, src_lang, trans_lang, BATCH_SIZE)?;

    let mut report = ImportReport::default();
    for batch in batches {
        report.merge(save_or_update(ctx, &batch)?);
    }
    Ok(report)
}

/// Upsert a list of parsed entries.
///
/// Oversized fields skip the entry with a warning; an entry whose
/// content hash already belongs to a different stored entry only gets
/// its translation terms merged. Every `BATCH_SIZE` processed entries,
/// and at the final entry, the store is flushed and cleared.
pub fn save_or_update(
    ctx: &mut ImportContext,
    entries: &[GlossaryEntry],
) -> Result<ImportReport, ServiceError> {
    let mut report = ImportReport::default();
    let mut counter = 0usize;

    for (i, entry) in entries.iter().enumerate() {
        let last = i + 1 == entries.len();

        if let Some(message) = validate_entry(entry) {
            report.warnings.push(message);
            counter += 1;
            if counter == BATCH_SIZE || last {
                commit(ctx.store)?;
                counter = 0;
            }
            continue;
        }

        let mut terms_only = false;
        if let Some(message) = check_for_duplicate(ctx.store, entry) {
            report.warnings.push(message);
            terms_only = true;
        }

        let id = transfer_and_persist(ctx, entry, terms_only, &mut report.warnings);
        report.entry_ids.push(id);

        counter += 1;
        if counter == BATCH_SIZE || last {
            commit(ctx.store)?;
            counter = 0;
        }
    }

    Ok(report)
}

/// Flush and clear: one unit-of-work cycle of the store.
fn commit(store: &mut GlossaryStore) -> Result<(), ServiceError> {
    store.flush()?;
    store.clear();
    tracing::debug!(
        entries = store.len(),
        cycles = store.flush_count(),
        "committed glossary batch"
    );
    Ok(())
}

fn validate_entry(entry: &GlossaryEntry) -> Option<String> {
    if entry.description.chars().count() > MAX_FIELD_LENGTH {
        return Some(format!(
            "Glossary description too long, maximum {MAX_FIELD_LENGTH} character"
        ));
    }
    if entry.pos.chars().count() > MAX_FIELD_LENGTH {
        return Some(format!(
            "Glossary part of speech too long, maximum {MAX_FIELD_LENGTH} character"
        ));
    }
    None
}

/// A stored entry with the same source content, pos and description but
/// a different identity means the incoming entry is a duplicate.
fn check_for_duplicate(store: &mut GlossaryStore, entry: &GlossaryEntry) -> Option<String> {
    let content_hash = hash::of_entry(entry);
    let existing = store.find_by_content_hash(&content_hash)?;

    if Some(existing.id) != entry.id {
        let src_content = entry.src_term().map(|t| t.content.as_str()).unwrap_or("");
        return Some(format!(
            "Duplicate glossary entry in source locale '{}', source content '{}', pos '{}', description '{}'",
            entry.src_lang, src_content, entry.pos, entry.description
        ));
    }
    None
}

fn transfer_and_persist(
    ctx: &mut ImportContext,
    from: &GlossaryEntry,
    terms_only: bool,
    warnings: &mut Vec<String>,
) -> u64 {
    let content_hash = hash::of_entry(from);
    let mut to = get_or_create(ctx.store, from, &content_hash);

    if !terms_only {
        to.source_ref = from.source_reference.clone();
        to.pos = from.pos.clone();
        to.description = from.description.clone();
        to.content_hash = content_hash;
    }

    let mut ignored: BTreeSet<String> = BTreeSet::new();

    for term in &from.glossary_terms {
        if term.locale.is_unset() {
            continue;
        }
        if terms_only && term.locale == from.src_lang {
            continue;
        }

        let Some(locale) = ctx.locales.get(&term.locale) else {
            ignored.insert(term.locale.to_string());
            continue;
        };

        let stored = to
            .terms
            .entry(locale.clone())
            .or_insert_with(|| StoredGlossaryTerm {
                content: term.content.clone(),
                comment: None,
                last_modified_by: None,
            });
        if stored.content != term.content {
            stored.content = term.content.clone();
        }
        stored.comment = term.comment.clone();
        stored.last_modified_by = ctx.username.map(|u| u.to_string());
    }

    if !ignored.is_empty() {
        let joined = ignored.into_iter().collect::<Vec<_>>().join(",");
        tracing::warn!(locales = %joined, "locale not enabled, terms ignored");
        warnings.push(format!(
            "Locale '{joined}' is not enabled. Terms in that locale were ignored."
        ));
    }

    let id = to.id;
    ctx.store.persist(to);
    id
}

/// Look up by explicit id, else by content hash, else start a fresh
/// entry carrying the incoming source metadata.
fn get_or_create(
    store: &mut GlossaryStore,
    from: &GlossaryEntry,
    content_hash: &str,
) -> StoredGlossaryEntry {
    if let Some(id) = from.id {
        if let Some(existing) = store.find_by_id(id) {
            return existing.clone();
        }
    } else if let Some(existing) = store.find_by_content_hash(content_hash) {
        return existing.clone();
    }

    StoredGlossaryEntry {
        id: store.allocate_id(),
        src_locale: from.src_lang.clone(),
        source_ref: from.source_reference.clone(),
        pos: from.pos.clone(),
        description: from.description.clone(),
        content_hash: content_hash.to_string(),
        terms: Default::default(),
    }
}
