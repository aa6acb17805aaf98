#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    GlossaryParse,
    GlossaryImport,
    GlossarySave,
    LocalesList,
    DetectEncoding,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "glossary.parse" => Command::GlossaryParse,
            "glossary.import" => Command::GlossaryImport,
            "glossary.save" => Command::GlossarySave,
            "locales.list" => Command::LocalesList,
            "encoding.detect" | "detect_encoding" => Command::DetectEncoding,
            _ => Command::Unknown,
        }
    }
}
