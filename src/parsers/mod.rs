use std::path::Path;

use crate::error::ServiceError;
use crate::model::entry::GlossaryEntry;
use crate::model::locale::LocaleId;
use crate::services::encoding;

pub mod csv;
pub mod po;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Malformed(String),

    #[error("invalid CSV: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Dispatch an uploaded glossary file to the reader for its extension.
///
/// PO files need both a source and a target locale; that is checked
/// before any bytes are decoded or parsed. Entries come back in batches
/// of `batch_size` so the caller can commit between batches.
pub fn parse_glossary_file(
    bytes: &[u8],
    file_name: &str,
    src_lang: &LocaleId,
    trans_lang: Option<&LocaleId>,
    batch_size: usize,
) -> Result<Vec<Vec<GlossaryEntry>>, ServiceError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" => {
            let text = encoding::decode(bytes);
            csv::extract_glossary(&text, src_lang, batch_size).map_err(|e| wrap(file_name, e))
        }
        "po" => {
            let trans_lang = match trans_lang {
                Some(l) if !l.is_unset() => l,
                _ => return Err(ServiceError::MissingPoLocales),
            };
            if src_lang.is_unset() {
                return Err(ServiceError::MissingPoLocales);
            }
            let text = encoding::decode(bytes);
            po::extract_glossary(&text, src_lang, trans_lang, batch_size)
                .map_err(|e| wrap(file_name, e))
        }
        _ => Err(ServiceError::UnsupportedFile(file_name.to_string())),
    }
}

fn wrap(file_name: &str, error: ParseError) -> ServiceError {
    ServiceError::FileProcessing {
        file_name: file_name.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let src = LocaleId::from("en-US");
        let result = parse_glossary_file(b"whatever", "terms.xlsx", &src, None, 50);
        assert!(matches!(result, Err(ServiceError::UnsupportedFile(_))));
    }

    #[test]
    fn po_without_target_locale_fails_before_parsing() {
        let src = LocaleId::from("en-US");
        // Deliberately not valid PO: the locale check must fire first.
        let result = parse_glossary_file(b"\xff\xfe garbage", "terms.po", &src, None, 50);
        assert!(matches!(result, Err(ServiceError::MissingPoLocales)));
    }

    #[test]
    fn csv_dispatch_parses_entries() {
        let src = LocaleId::from("en-US");
        let text = "en-US,de\nhouse,Haus\n";
        let batches = parse_glossary_file(text.as_bytes(), "terms.csv", &src, None, 50).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let src = LocaleId::from("en-US");
        let text = "en-US,de\nhouse,Haus\n";
        let batches = parse_glossary_file(text.as_bytes(), "TERMS.CSV", &src, None, 50).unwrap();
        assert_eq!(batches[0].len(), 1);
    }
}
