use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::model::entry::GlossaryEntry;
use crate::model::locale::LocaleId;
use crate::parsers;
use crate::services::encoding;
use crate::services::glossary::store::GlossaryStore;
use crate::services::import::{self, ImportContext, ImportReport};
use crate::services::locales::LocaleRegistry;

mod command;
use command::Command;

const GLOSSARY_FILE: &str = "glossary.json";

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, String> {
    match payload.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(format!("payload.{key} is required")),
    }
}

fn optional_locale(payload: &Value, key: &str) -> Option<LocaleId> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(LocaleId::from)
}

fn parse_entries_from_payload(payload: &Value) -> Result<Vec<GlossaryEntry>, String> {
    let arr = payload
        .get("entries")
        .and_then(|v| v.as_array())
        .ok_or_else(|| "payload.entries must be an array".to_string())?;

    let mut entries: Vec<GlossaryEntry> = Vec::with_capacity(arr.len());

    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<GlossaryEntry>(v) {
            Ok(e) => entries.push(e),
            Err(e) => return Err(format!("invalid entry at index {i}: {e}")),
        }
    }

    Ok(entries)
}

/// Locale registry for one request: an explicit `enabled_locales` list
/// wins over the instance configuration.
fn registry_from(payload: &Value) -> LocaleRegistry {
    match payload.get("enabled_locales").and_then(|v| v.as_array()) {
        Some(codes) => LocaleRegistry::from_codes(
            codes
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string()),
        ),
        None => LocaleRegistry::load_default(),
    }
}

fn store_path(payload: &Value) -> PathBuf {
    payload
        .get("store_path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(GLOSSARY_FILE))
}

fn read_upload(payload: &Value) -> Result<(Vec<u8>, String), String> {
    let path_str = required_str(payload, "path")?;
    let path = Path::new(path_str);

    let file_name = payload
        .get("file_name")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| {
            path.file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| path_str.to_string());

    let bytes = fs::read(path).map_err(|e| format!("failed to read {path_str}: {e}"))?;
    Ok((bytes, file_name))
}

fn import_response(store: &GlossaryStore, report: &ImportReport) -> Value {
    let entries: Vec<Value> = report
        .entry_ids
        .iter()
        .filter_map(|id| store.find_by_id(*id))
        .filter_map(|e| serde_json::to_value(e.to_dto()).ok())
        .collect();

    json!({
        "entries": entries,
        "warnings": report.warnings
    })
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "lexicon-core alive" })),

        Command::GlossaryParse => {
            let (bytes, file_name) = match read_upload(payload) {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let src_lang = match required_str(payload, "source_lang") {
                Ok(s) => LocaleId::from(s),
                Err(e) => return err(id, e),
            };
            let trans_lang = optional_locale(payload, "target_lang");

            match parsers::parse_glossary_file(
                &bytes,
                &file_name,
                &src_lang,
                trans_lang.as_ref(),
                import::BATCH_SIZE,
            ) {
                Ok(batches) => ok(id, json!({ "batches": batches })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::GlossaryImport => {
            let (bytes, file_name) = match read_upload(payload) {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let src_lang = match required_str(payload, "source_lang") {
                Ok(s) => LocaleId::from(s),
                Err(e) => return err(id, e),
            };
            let trans_lang = optional_locale(payload, "target_lang");
            let username = payload.get("username").and_then(|v| v.as_str());

            let mut store = match GlossaryStore::open(store_path(payload)) {
                Ok(s) => s,
                Err(e) => return err(id, e.to_string()),
            };
            let locales = registry_from(payload);
            let mut ctx = ImportContext {
                store: &mut store,
                locales: &locales,
                username,
            };

            match import::import_file(&mut ctx, &bytes, &file_name, &src_lang, trans_lang.as_ref())
            {
                Ok(report) => ok(id, import_response(&store, &report)),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::GlossarySave => {
            let entries = match parse_entries_from_payload(payload) {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let username = payload.get("username").and_then(|v| v.as_str());

            let mut store = match GlossaryStore::open(store_path(payload)) {
                Ok(s) => s,
                Err(e) => return err(id, e.to_string()),
            };
            let locales = registry_from(payload);
            let mut ctx = ImportContext {
                store: &mut store,
                locales: &locales,
                username,
            };

            match import::save_or_update(&mut ctx, &entries) {
                Ok(report) => ok(id, import_response(&store, &report)),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::LocalesList => {
            let locales = registry_from(payload);
            ok(id, json!({ "locales": locales.codes() }))
        }

        Command::DetectEncoding => {
            let path_str = match required_str(payload, "path") {
                Ok(s) => s,
                Err(e) => return err(id, e),
            };
            match encoding::detect_from_file(Path::new(path_str)) {
                Ok(result) => ok(id, serde_json::to_value(result).unwrap_or(json!({}))),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(input: &str) -> Value {
        serde_json::from_str(&handle(input)).unwrap()
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lexicon-proto-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn ping_answers_ok() {
        let resp = response(r#"{"id":1,"cmd":"ping"}"#);
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["id"], 1);
    }

    #[test]
    fn invalid_json_is_reported() {
        let resp = response("{nope");
        assert_eq!(resp["status"], "error");
    }

    #[test]
    fn unknown_command_is_reported() {
        let resp = response(r#"{"id":2,"cmd":"glossary.destroy"}"#);
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "unknown command");
    }

    #[test]
    fn locales_list_honors_override() {
        let resp = response(
            r#"{"id":3,"cmd":"locales.list","payload":{"enabled_locales":["de","en-US"]}}"#,
        );
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["locales"], json!(["de", "en-US"]));
    }

    #[test]
    fn glossary_save_persists_and_reports_warnings() {
        let store = temp_path("save");
        let _ = fs::remove_file(&store);

        let req = json!({
            "id": 4,
            "cmd": "glossary.save",
            "payload": {
                "store_path": store.to_string_lossy(),
                "username": "admin",
                "enabled_locales": ["en-US", "de"],
                "entries": [
                    {
                        "src_lang": "en-US",
                        "pos": "noun",
                        "glossary_terms": [
                            { "locale": "en-US", "content": "house" },
                            { "locale": "de", "content": "Haus" },
                            { "locale": "xx", "content": "???" }
                        ]
                    }
                ]
            }
        });

        let resp = response(&req.to_string());
        assert_eq!(resp["status"], "ok");
        let payload = &resp["payload"];
        assert_eq!(payload["entries"].as_array().unwrap().len(), 1);
        assert_eq!(payload["warnings"].as_array().unwrap().len(), 1);

        let reopened = GlossaryStore::open(&store).unwrap();
        assert_eq!(reopened.len(), 1);

        let _ = fs::remove_file(&store);
    }

    #[test]
    fn glossary_import_reads_a_csv_upload() {
        let store = temp_path("import-store");
        let upload = temp_path("import-upload.csv");
        let _ = fs::remove_file(&store);
        fs::write(&upload, "en-US,de\nhouse,Haus\n").unwrap();

        let req = json!({
            "id": 5,
            "cmd": "glossary.import",
            "payload": {
                "path": upload.to_string_lossy(),
                "file_name": "upload.csv",
                "source_lang": "en-US",
                "store_path": store.to_string_lossy(),
                "enabled_locales": ["en-US", "de"]
            }
        });

        let resp = response(&req.to_string());
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["entries"].as_array().unwrap().len(), 1);

        let _ = fs::remove_file(&store);
        let _ = fs::remove_file(&upload);
    }

    #[test]
    fn missing_source_lang_is_rejected() {
        let upload = temp_path("nosrc.csv");
        fs::write(&upload, "en-US,de\nhouse,Haus\n").unwrap();

        let req = json!({
            "id": 6,
            "cmd": "glossary.parse",
            "payload": { "path": upload.to_string_lossy() }
        });

        let resp = response(&req.to_string());
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "payload.source_lang is required");

        let _ = fs::remove_file(&upload);
    }
}
