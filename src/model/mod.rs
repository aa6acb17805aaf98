pub mod entry;
pub mod locale;
