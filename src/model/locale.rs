use std::fmt;

use serde::{Deserialize, Serialize};

/// Locale identifier, e.g. "en-US" or "pt-BR".
///
/// Kept as an opaque string: the platform treats locale codes as
/// configuration, not as something to parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleId(String);

impl LocaleId {
    pub fn new(id: impl Into<String>) -> Self {
        LocaleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty or whitespace-only code means the locale is unset.
    pub fn is_unset(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocaleId {
    fn from(s: &str) -> Self {
        LocaleId(s.to_string())
    }
}
