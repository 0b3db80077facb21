//! Sound system generation.

use crate::operation::GatedOperation;
use lexiforge_core::{LanguageDefinition, Phonology};
use lexiforge_validate::ValidationPass;
use serde::{Deserialize, Serialize};

/// Request for a sound system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRequest {
    /// Language name
    pub name: String,
    /// Free-form design brief
    pub description: String,
}

impl InventoryRequest {
    /// Create a request
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Generates the phoneme inventory, phonotactics and orthography.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryOperation;

impl GatedOperation for InventoryOperation {
    type Request = InventoryRequest;
    type Output = Phonology;

    fn name(&self) -> &'static str {
        "inventory"
    }

    fn passes(&self) -> &'static [ValidationPass] {
        &[ValidationPass::Phonological, ValidationPass::CrossModule]
    }

    fn prompt(&self, request: &InventoryRequest, _base: &LanguageDefinition) -> String {
        format!(
            r#"Design the sound system of a constructed language called "{name}".
Brief: {brief}

Return JSON of this shape:
{{
  "inventory": {{"consonants": ["p", ...], "vowels": ["a", ...], "tones": []}},
  "phonotactics": {{
    "syllableTemplates": ["CV(C)", ...],
    "onsetClusters": [["p", "l"], ...],
    "codaClusters": [],
    "allophony": [{{"phoneme": "t", "allophone": "ɾ", "environment": "between vowels", "position": "onset"}}]
  }},
  "orthography": {{"p": "p", ...}}
}}

Templates use C and V with at most one parenthesized optional group.
Every phoneme needs exactly one grapheme and no two phonemes may share one."#,
            name = request.name,
            brief = if request.description.is_empty() {
                "none"
            } else {
                request.description.as_str()
            }
        )
    }

    fn candidate(&self, base: &LanguageDefinition, output: &Phonology) -> LanguageDefinition {
        LanguageDefinition {
            phonology: output.clone(),
            ..base.clone()
        }
    }

    fn merge(&self, state: &mut LanguageDefinition, output: Phonology) {
        state.phonology = output;
    }

    fn describe(&self, output: &Phonology) -> String {
        format!(
            "{} consonants, {} vowels, {} syllable template(s)",
            output.inventory.consonants.len(),
            output.inventory.vowels.len(),
            output.phonotactics.syllable_templates.len()
        )
    }
}
