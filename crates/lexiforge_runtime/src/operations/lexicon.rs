//! Lexicon batches.

use super::{grammar_summary, next_free_id, sound_summary};
use crate::operation::{GatedOperation, ParseError, extract_json};
use lexiforge_core::{LanguageDefinition, LexEntry, PartOfSpeech, RequiredSlot};
use lexiforge_validate::ValidationPass;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A required slot the batch should fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    /// Slot id, e.g. `pron.1sg`
    pub id: String,
    /// English gloss
    pub gloss: String,
    /// Expected part of speech
    pub pos: PartOfSpeech,
}

impl From<&RequiredSlot> for SlotRequest {
    fn from(slot: &RequiredSlot) -> Self {
        Self {
            id: slot.id.to_string(),
            gloss: slot.gloss.to_string(),
            pos: slot.pos,
        }
    }
}

/// Request for one batch of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconRequest {
    /// 1-based batch number
    pub batch: u32,
    /// Entries wanted
    pub count: usize,
    /// Required slots still unfilled, served first
    pub slots: Vec<SlotRequest>,
    /// Semantic fields for the rest of the batch
    pub fields: Vec<String>,
    /// Lemmas already in the lexicon
    pub avoid: Vec<String>,
    /// Digest of the language the batch is built on
    pub basis: String,
}

/// One batch of new entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconBatch {
    /// New entries
    pub entries: Vec<LexEntry>,
}

/// Generates lexicon entries, required slots first.
///
/// Only the batch is validated, so problems elsewhere in the language never
/// block a batch. Merging skips entries whose lemma is already present and
/// renumbers ids that collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconOperation;

impl GatedOperation for LexiconOperation {
    type Request = LexiconRequest;
    type Output = LexiconBatch;

    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn passes(&self) -> &'static [ValidationPass] {
        &[ValidationPass::Phonological, ValidationPass::CrossModule]
    }

    fn prompt(&self, request: &LexiconRequest, base: &LanguageDefinition) -> String {
        let mut wanted = String::new();
        for slot in &request.slots {
            let _ = writeln!(
                wanted,
                "- \"{}\" ({}): set \"slot\": \"{}\"",
                slot.gloss, slot.pos, slot.id
            );
        }
        let rest = request.count.saturating_sub(request.slots.len());
        if rest > 0 {
            let _ = writeln!(
                wanted,
                "- {rest} more words from these fields: {}",
                request.fields.join(", ")
            );
        }
        let avoid = if request.avoid.is_empty() {
            "none yet".to_string()
        } else {
            request.avoid.join(", ")
        };
        format!(
            r#"Add {count} words to the lexicon of "{name}" (batch {batch}).
{sounds}{grammar}
Words wanted:
{wanted}
Lemmas already used: {avoid}

Return JSON: {{"entries": [{{"id": "w1", "lemma": "pasta", "ipa": "/pas.ta/", "pos": "noun",
"gloss": "stone", "slot": null, "senses": [], "derivedForms": []}}]}}
Every IPA form must use only the listed phonemes and fit the syllable templates."#,
            count = request.count,
            name = base.name,
            batch = request.batch,
            sounds = sound_summary(base),
            grammar = grammar_summary(base),
        )
    }

    fn parse(&self, raw: &str) -> Result<LexiconBatch, ParseError> {
        let json = extract_json(raw)?;
        let batch = if json.starts_with('[') {
            LexiconBatch {
                entries: serde_json::from_str(json).map_err(|e| ParseError::Schema(e.to_string()))?,
            }
        } else {
            serde_json::from_str(json).map_err(|e| ParseError::Schema(e.to_string()))?
        };
        if batch.entries.is_empty() {
            return Err(ParseError::Invalid("the batch contains no entries".into()));
        }
        Ok(batch)
    }

    fn candidate(&self, base: &LanguageDefinition, output: &LexiconBatch) -> LanguageDefinition {
        LanguageDefinition {
            lexicon: output.entries.clone(),
            ..base.clone()
        }
    }

    fn merge(&self, state: &mut LanguageDefinition, output: LexiconBatch) {
        for mut entry in output.entries {
            if state.lexicon.iter().any(|e| e.lemma == entry.lemma) {
                tracing::debug!(lemma = %entry.lemma, "skipping duplicate lemma");
                continue;
            }
            if state.lexicon.iter().any(|e| e.id == entry.id) {
                let id = next_free_id("w", state.lexicon.len() + 1, state.lexicon.iter().map(|e| e.id.as_str()));
                tracing::debug!(from = %entry.id, to = %id, "renumbering colliding id");
                entry.id = id;
            }
            state.lexicon.push(entry);
        }
    }

    fn describe(&self, output: &LexiconBatch) -> String {
        let slots = output.entries.iter().filter(|e| e.slot.is_some()).count();
        format!("{} entries ({slots} filling required slots)", output.entries.len())
    }
}
