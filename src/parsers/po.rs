use regex::Regex;

use super::ParseError;
use crate::model::entry::{GlossaryEntry, GlossaryTerm};
use crate::model::locale::LocaleId;

#[derive(PartialEq)]
enum Section {
    None,
    MsgId,
    MsgStr,
}

#[derive(Default)]
struct Unit {
    references: Vec<String>,
    translator_comments: Vec<String>,
    extracted_comments: Vec<String>,
    fuzzy: bool,
    msgid: String,
    msgstr: String,
}

/// Read a gettext PO glossary into entry batches.
///
/// Supported subset: `msgid`/`msgstr` with continuation lines, `#:`
/// references, `#.` extractor comments, `#` translator comments and the
/// `fuzzy` flag. The header unit (empty msgid), fuzzy units and units
/// without a translation are skipped; plural forms are not accepted.
pub fn extract_glossary(
    text: &str,
    src_lang: &LocaleId,
    trans_lang: &LocaleId,
    batch_size: usize,
) -> Result<Vec<Vec<GlossaryEntry>>, ParseError> {
    let msgid_re = Regex::new(r#"^msgid\s+"(.*)"$"#).unwrap();
    let msgstr_re = Regex::new(r#"^msgstr\s+"(.*)"$"#).unwrap();
    let cont_re = Regex::new(r#"^"(.*)"$"#).unwrap();

    let mut batches: Vec<Vec<GlossaryEntry>> = Vec::new();
    let mut batch: Vec<GlossaryEntry> = Vec::new();

    let mut unit = Unit::default();
    let mut section = Section::None;

    let finish =
        |unit: &mut Unit, batch: &mut Vec<GlossaryEntry>, batches: &mut Vec<Vec<GlossaryEntry>>| {
            let unit = std::mem::take(unit);
            if let Some(entry) = build_entry(unit, src_lang, trans_lang) {
                batch.push(entry);
                if batch.len() == batch_size {
                    batches.push(std::mem::take(batch));
                }
            }
        };

    for (i, raw) in text.lines().enumerate() {
        let ln = i + 1;
        let line = raw.trim_end_matches('\r').trim();

        if line.is_empty() {
            if section == Section::MsgStr {
                finish(&mut unit, &mut batch, &mut batches);
            }
            section = Section::None;
            continue;
        }

        if line.starts_with("#~") {
            // Obsolete unit; whatever was pending before it is complete.
            if section == Section::MsgStr {
                finish(&mut unit, &mut batch, &mut batches);
            }
            section = Section::None;
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            if section == Section::MsgStr {
                finish(&mut unit, &mut batch, &mut batches);
                section = Section::None;
            }
            match rest.chars().next() {
                Some(':') => unit.references.push(rest[1..].trim().to_string()),
                Some('.') => unit.extracted_comments.push(rest[1..].trim().to_string()),
                Some(',') => {
                    if rest[1..].split(',').any(|f| f.trim() == "fuzzy") {
                        unit.fuzzy = true;
                    }
                }
                _ => unit.translator_comments.push(rest.trim().to_string()),
            }
            continue;
        }

        if let Some(caps) = msgid_re.captures(line) {
            if section == Section::MsgStr {
                finish(&mut unit, &mut batch, &mut batches);
            }
            unit.msgid = unescape(&caps[1]);
            section = Section::MsgId;
        } else if let Some(caps) = msgstr_re.captures(line) {
            if section != Section::MsgId {
                return Err(ParseError::Malformed(format!(
                    "line {ln}: msgstr without a preceding msgid"
                )));
            }
            unit.msgstr = unescape(&caps[1]);
            section = Section::MsgStr;
        } else if let Some(caps) = cont_re.captures(line) {
            match section {
                Section::MsgId => unit.msgid.push_str(&unescape(&caps[1])),
                Section::MsgStr => unit.msgstr.push_str(&unescape(&caps[1])),
                Section::None => {
                    return Err(ParseError::Malformed(format!(
                        "line {ln}: string continuation outside msgid/msgstr"
                    )))
                }
            }
        } else {
            return Err(ParseError::Malformed(format!(
                "line {ln}: unrecognized PO syntax"
            )));
        }
    }

    if section == Section::MsgStr {
        finish(&mut unit, &mut batch, &mut batches);
    }

    if !batch.is_empty() {
        batches.push(batch);
    }

    Ok(batches)
}

fn build_entry(unit: Unit, src_lang: &LocaleId, trans_lang: &LocaleId) -> Option<GlossaryEntry> {
    // Empty msgid is the PO header; nothing to import without a translation.
    if unit.msgid.is_empty() || unit.msgstr.is_empty() || unit.fuzzy {
        return None;
    }

    let source_reference = if unit.references.is_empty() {
        None
    } else {
        Some(unit.references.join(", "))
    };

    let src_comment = join_comments(&unit.extracted_comments);
    let trans_comment = join_comments(&unit.translator_comments);

    Some(GlossaryEntry {
        id: None,
        src_lang: src_lang.clone(),
        pos: String::new(),
        description: String::new(),
        source_reference,
        glossary_terms: vec![
            GlossaryTerm {
                locale: src_lang.clone(),
                content: unit.msgid,
                comment: src_comment,
            },
            GlossaryTerm {
                locale: trans_lang.clone(),
                content: unit.msgstr,
                comment: trans_comment,
            },
        ],
    })
}

fn join_comments(comments: &[String]) -> Option<String> {
    if comments.is_empty() {
        None
    } else {
        Some(comments.join("\n"))
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> (LocaleId, LocaleId) {
        (LocaleId::from("en-US"), LocaleId::from("de"))
    }

    fn parse(text: &str) -> Vec<GlossaryEntry> {
        let (src, trans) = langs();
        extract_glossary(text, &src, &trans, 50)
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn parses_units_with_comments_and_references() {
        let text = "\
# team glossary
#. a building for living in
#: ui/home.txt:3
msgid \"house\"
msgstr \"Haus\"

msgid \"tree\"
msgstr \"Baum\"
";
        let entries = parse(text);
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.source_reference.as_deref(), Some("ui/home.txt:3"));
        assert_eq!(first.glossary_terms.len(), 2);
        assert_eq!(first.src_term().unwrap().content, "house");
        assert_eq!(
            first.src_term().unwrap().comment.as_deref(),
            Some("a building for living in")
        );
        assert_eq!(first.glossary_terms[1].content, "Haus");
        assert_eq!(
            first.glossary_terms[1].comment.as_deref(),
            Some("team glossary")
        );
    }

    #[test]
    fn header_unit_is_skipped() {
        let text = "\
msgid \"\"
msgstr \"\"
\"Content-Type: text/plain; charset=UTF-8\\n\"

msgid \"house\"
msgstr \"Haus\"
";
        let entries = parse(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].src_term().unwrap().content, "house");
    }

    #[test]
    fn continuations_and_escapes_are_applied() {
        let text = "\
msgid \"multi \"
\"word \\\"term\\\"\"
msgstr \"mehr\\n\"
\"Worte\"
";
        let entries = parse(text);
        assert_eq!(entries[0].src_term().unwrap().content, "multi word \"term\"");
        assert_eq!(entries[0].glossary_terms[1].content, "mehr\nWorte");
    }

    #[test]
    fn untranslated_and_fuzzy_units_are_skipped() {
        let text = "\
msgid \"house\"
msgstr \"\"

#, fuzzy
msgid \"tree\"
msgstr \"Baum\"

msgid \"dog\"
msgstr \"Hund\"
";
        let entries = parse(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].src_term().unwrap().content, "dog");
    }

    #[test]
    fn units_are_batched() {
        let text = "\
msgid \"a\"
msgstr \"b\"

msgid \"c\"
msgstr \"d\"

msgid \"e\"
msgstr \"f\"
";
        let (src, trans) = langs();
        let batches = extract_glossary(text, &src, &trans, 2).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1].len(), 1);
    }

    #[test]
    fn stray_msgstr_is_an_error() {
        let (src, trans) = langs();
        let result = extract_glossary("msgstr \"Haus\"\n", &src, &trans, 50);
        assert!(matches!(result, Err(ParseError::Malformed(_))));
    }
}
