pub mod encoding;
pub mod glossary;
pub mod import;
pub mod locales;
