use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::model::StoredGlossaryEntry;
use crate::error::ServiceError;

/// File-backed glossary store.
///
/// All entries live in memory; `flush` writes them out atomically and
/// `clear` drops the lazy content-hash index, the two together forming
/// one batch-commit cycle of the import pipeline.
pub struct GlossaryStore {
    path: Option<PathBuf>,
    entries: Vec<StoredGlossaryEntry>,
    hash_index: Option<HashMap<String, usize>>,
    next_id: u64,
    flushes: usize,
}

impl GlossaryStore {
    pub fn in_memory() -> Self {
        GlossaryStore {
            path: None,
            entries: Vec::new(),
            hash_index: None,
            next_id: 1,
            flushes: 0,
        }
    }

    /// Open the store at `path`, loading existing entries. A missing
    /// file is an empty store; a corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let path = path.into();

        let entries: Vec<StoredGlossaryEntry> = if path.exists() {
            let data = fs::read_to_string(&path)
                .map_err(|e| ServiceError::Store(format!("failed to read {}: {e}", path.display())))?;
            serde_json::from_str(&data)
                .map_err(|e| ServiceError::Store(format!("failed to parse {}: {e}", path.display())))?
        } else {
            Vec::new()
        };

        let next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        Ok(GlossaryStore {
            path: Some(path),
            entries,
            hash_index: None,
            next_id,
            flushes: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn find_by_id(&self, id: u64) -> Option<&StoredGlossaryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_by_content_hash(&mut self, content_hash: &str) -> Option<&StoredGlossaryEntry> {
        let slot = *self.index().get(content_hash)?;
        self.entries.get(slot)
    }

    /// Insert a new entry or replace the stored one with the same id.
    pub fn persist(&mut self, entry: StoredGlossaryEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        // Hashes may have moved; rebuild lazily on next lookup.
        self.hash_index = None;
    }

    /// Write the entries out (sorted by id, atomic rename) and count
    /// the cycle for batch accounting.
    pub fn flush(&mut self) -> Result<(), ServiceError> {
        self.entries.sort_by_key(|e| e.id);

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&self.entries)
                .map_err(|e| ServiceError::Store(format!("failed to serialize store: {e}")))?;
            write_atomic(path, json.as_bytes())?;
        }

        self.flushes += 1;
        Ok(())
    }

    /// Drop the lazy lookup cache, ending the current unit of work.
    pub fn clear(&mut self) {
        self.hash_index = None;
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    fn index(&mut self) -> &HashMap<String, usize> {
        if self.hash_index.is_none() {
            let index = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| (e.content_hash.clone(), i))
                .collect();
            self.hash_index = Some(index);
        }
        self.hash_index.get_or_insert_with(HashMap::new)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| ServiceError::Store(format!("failed to create {}: {e}", parent.display())))?;
        }
    }

    fs::write(&tmp, bytes)
        .map_err(|e| ServiceError::Store(format!("failed to write {}: {e}", tmp.display())))?;

    fs::rename(&tmp, path)
        .map_err(|e| ServiceError::Store(format!("failed to replace {}: {e}", path.display())))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "glossary".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
