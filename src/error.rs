use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Unsupported glossary file: {0}")]
    UnsupportedFile(String),

    #[error("Error processing glossary file: {file_name}. {message}")]
    FileProcessing { file_name: String, message: String },

    #[error("Mandatory fields for PO file format: source language and target language")]
    MissingPoLocales,

    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Glossary store error: {0}")]
    Store(String),
}
