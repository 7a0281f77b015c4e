//! Long-name translation table.
//!
//! Projects reference display texts by id (`long_name_id`); the actual texts
//! live in a per-language translation database shipped separately. This
//! module holds the read-only `text id → text` mapping and the fallback
//! rule: an id that is missing or untranslatable resolves to the raw long
//! name stored in the project.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// The one id that is known to map to a placeholder text shared by many
/// unrelated long names; it is never used for translation.
const AMBIGUOUS_TEXT_ID: &str = "MAS00194";

#[derive(Debug, Default)]
pub struct Translations {
    texts: HashMap<String, String>,
}

impl Translations {
    /// No translations; every lookup falls back to the raw long name.
    pub fn empty() -> Translations {
        Translations::default()
    }

    pub fn from_map(texts: HashMap<String, String>) -> Translations {
        Translations { texts }
    }

    /// Load a translation table from a tab-separated `text_id<TAB>text`
    /// export. Blank lines and lines without a separator are skipped.
    pub fn load(path: &Path) -> Result<Translations> {
        let mut texts = HashMap::new();
        for line in BufReader::new(File::open(path)?).lines() {
            let line = line?;
            if let Some((id, text)) = line.split_once('\t') {
                if !id.is_empty() {
                    texts.insert(id.to_string(), text.to_string());
                }
            }
        }
        Ok(Translations { texts })
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Translate a long name by its id, falling back to the stored long
    /// name when the id is absent, unknown or ambiguous.
    pub fn long_name(&self, id: Option<&str>, long_name: Option<&str>) -> Option<String> {
        match id {
            Some(id) if id != AMBIGUOUS_TEXT_ID => match self.texts.get(id) {
                Some(text) => Some(text.clone()),
                None => long_name.map(str::to_owned),
            },
            _ => long_name.map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Translations {
        let mut texts = HashMap::new();
        texts.insert("MAS01234".to_string(), "Engine speed".to_string());
        texts.insert(AMBIGUOUS_TEXT_ID.to_string(), "---".to_string());
        Translations::from_map(texts)
    }

    #[test]
    fn translates_known_ids() {
        let t = table();
        assert_eq!(
            t.long_name(Some("MAS01234"), Some("Motordrehzahl")),
            Some("Engine speed".to_string())
        );
    }

    #[test]
    fn falls_back_for_unknown_ids() {
        let t = table();
        assert_eq!(
            t.long_name(Some("MAS99999"), Some("Motordrehzahl")),
            Some("Motordrehzahl".to_string())
        );
        assert_eq!(t.long_name(None, Some("Motordrehzahl")), Some("Motordrehzahl".to_string()));
    }

    #[test]
    fn ambiguous_id_is_never_translated() {
        let t = table();
        assert_eq!(
            t.long_name(Some(AMBIGUOUS_TEXT_ID), Some("Kilometerstand")),
            Some("Kilometerstand".to_string())
        );
    }
}
