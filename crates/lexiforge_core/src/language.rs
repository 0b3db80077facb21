//! The complete language definition.

use crate::corpus::CorpusSentence;
use crate::error::{CoreError, CoreResult};
use crate::lexicon::LexEntry;
use crate::morphology::Morphology;
use crate::phonology::Phonology;
use crate::syntax::Syntax;
use serde::{Deserialize, Serialize};

/// A constructed language: every module the validator checks and the
/// pipeline grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDefinition {
    /// Identifier
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Sound system
    #[serde(default)]
    pub phonology: Phonology,
    /// Morphology
    #[serde(default)]
    pub morphology: Morphology,
    /// Syntax
    #[serde(default)]
    pub syntax: Syntax,
    /// Lexicon, in insertion order
    #[serde(default)]
    pub lexicon: Vec<LexEntry>,
    /// Example sentences
    #[serde(default)]
    pub corpus: Vec<CorpusSentence>,
}

impl LanguageDefinition {
    /// Create an empty definition
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Decode from JSON
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEncoding`] if the JSON does not match the schema
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a lexicon entry by id
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no entry has this id
    pub fn entry(&self, id: &str) -> CoreResult<&LexEntry> {
        self.lexicon
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "LexEntry".to_string(),
                id: id.to_string(),
            })
    }

    /// Check whether an entry with this id or orthographic form exists
    #[must_use]
    pub fn has_entry(&self, id: &str, lemma: &str) -> bool {
        self.lexicon.iter().any(|e| e.id == id || e.lemma == lemma)
    }
}
