use csv::{ReaderBuilder, Trim};

use super::ParseError;
use crate::model::entry::{GlossaryEntry, GlossaryTerm};
use crate::model::locale::LocaleId;

/// Columns are classified from the header row: `pos` and `description`
/// (case-insensitive) are metadata, everything else is a locale code.
enum Column {
    Locale(LocaleId),
    Pos,
    Description,
}

/// Read a glossary CSV into entry batches.
///
/// The header row must contain a column for the source locale; each data
/// row yields one entry with a term per non-empty locale cell. Rows with
/// an empty source cell carry nothing to import and are skipped.
pub fn extract_glossary(
    text: &str,
    src_lang: &LocaleId,
    batch_size: usize,
) -> Result<Vec<Vec<GlossaryEntry>>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();

    let columns: Vec<Column> = headers
        .iter()
        .map(|name| {
            if name.eq_ignore_ascii_case("pos") {
                Column::Pos
            } else if name.eq_ignore_ascii_case("description") {
                Column::Description
            } else {
                Column::Locale(LocaleId::from(name))
            }
        })
        .collect();

    let src_column = columns
        .iter()
        .position(|c| matches!(c, Column::Locale(l) if l == src_lang))
        .ok_or_else(|| {
            ParseError::Malformed(format!(
                "source locale '{src_lang}' not found in CSV header"
            ))
        })?;

    let mut batches: Vec<Vec<GlossaryEntry>> = Vec::new();
    let mut batch: Vec<GlossaryEntry> = Vec::new();

    for record in reader.records() {
        let record = record?;

        if record.get(src_column).unwrap_or("").is_empty() {
            continue;
        }

        let mut entry = GlossaryEntry {
            id: None,
            src_lang: src_lang.clone(),
            pos: String::new(),
            description: String::new(),
            source_reference: None,
            glossary_terms: Vec::new(),
        };

        for (column, cell) in columns.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            match column {
                Column::Pos => entry.pos = cell.to_string(),
                Column::Description => entry.description = cell.to_string(),
                Column::Locale(locale) => entry.glossary_terms.push(GlossaryTerm {
                    locale: locale.clone(),
                    content: cell.to_string(),
                    comment: None,
                }),
            }
        }

        batch.push(entry);
        if batch.len() == batch_size {
            batches.push(std::mem::take(&mut batch));
        }
    }

    if !batch.is_empty() {
        batches.push(batch);
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src() -> LocaleId {
        LocaleId::from("en-US")
    }

    #[test]
    fn parses_locale_and_metadata_columns() {
        let text = "en-US,de,pos,description\n\
                    house,Haus,noun,a building\n\
                    run,laufen,verb,to move fast\n";
        let batches = extract_glossary(text, &src(), 50).unwrap();
        assert_eq!(batches.len(), 1);
        let entries = &batches[0];
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.pos, "noun");
        assert_eq!(first.description, "a building");
        assert_eq!(first.glossary_terms.len(), 2);
        assert_eq!(first.src_term().unwrap().content, "house");
        assert_eq!(first.glossary_terms[1].locale, LocaleId::from("de"));
        assert_eq!(first.glossary_terms[1].content, "Haus");
    }

    #[test]
    fn missing_source_locale_column_is_an_error() {
        let text = "de,fr\nHaus,maison\n";
        let result = extract_glossary(text, &src(), 50);
        assert!(matches!(result, Err(ParseError::Malformed(_))));
    }

    #[test]
    fn rows_without_source_content_are_skipped() {
        let text = "en-US,de\nhouse,Haus\n,Baum\n";
        let batches = extract_glossary(text, &src(), 50).unwrap();
        assert_eq!(batches[0].len(), 1);
    }

    #[test]
    fn empty_target_cells_produce_no_term() {
        let text = "en-US,de,fr\nhouse,Haus,\n";
        let batches = extract_glossary(text, &src(), 50).unwrap();
        let entry = &batches[0][0];
        assert_eq!(entry.glossary_terms.len(), 2);
        assert!(entry
            .glossary_terms
            .iter()
            .all(|t| t.locale != LocaleId::from("fr")));
    }

    #[test]
    fn entries_are_batched() {
        let mut text = String::from("en-US,de\n");
        for i in 0..51 {
            text.push_str(&format!("term{i},begriff{i}\n"));
        }
        let batches = extract_glossary(&text, &src(), 50).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 50);
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn header_cells_are_trimmed() {
        let text = " en-US , de \nhouse,Haus\n";
        let batches = extract_glossary(text, &src(), 50).unwrap();
        assert_eq!(batches[0].len(), 1);
    }
}
