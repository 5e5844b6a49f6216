use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PortResult;
use crate::types::Language;

/// User preferences that change how ports behave. Read from a
/// `settings.json`; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortSettings {
    /// Whether tags that were left unspecified produce a note.
    pub alert_unspecified: bool,
    /// Write the 100 byte party structure instead of the 80 byte box one.
    pub pk3_party_format: bool,
    /// Language written when a pku has none and no choice is needed.
    pub default_language: String,
}

impl Default for PortSettings {
    fn default() -> Self {
        PortSettings {
            alert_unspecified: true,
            pk3_party_format: false,
            default_language: String::from("English"),
        }
    }
}

impl PortSettings {
    pub fn from_file(path: impl AsRef<Path>) -> PortResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let settings = serde_json::from_reader(std::io::BufReader::new(file))?;
        log::debug!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn default_language(&self) -> Language {
        Language::from_name(&self.default_language).unwrap_or_else(|| {
            log::warn!(
                "Unknown default language {}, falling back to English",
                self.default_language
            );
            Language::English
        })
    }
}
