//! Example sentences.

use serde::{Deserialize, Serialize};

/// An interlinear corpus sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSentence {
    /// Stable identifier
    pub id: String,
    /// Orthographic text
    pub text: String,
    /// Phonological transcription
    #[serde(default)]
    pub ipa: String,
    /// Morpheme-by-morpheme gloss
    #[serde(default)]
    pub gloss: String,
    /// Free translation
    pub translation: String,
    /// Observed constituent order, e.g. `SOV` or `SV`
    #[serde(default)]
    pub constituent_order: Option<String>,
}
