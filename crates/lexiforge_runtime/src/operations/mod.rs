//! The six gated operation kinds.

pub mod consistency;
pub mod corpus;
pub mod explain;
pub mod inventory;
pub mod lexicon;
pub mod paradigms;

pub use consistency::{ConsistencyOperation, ConsistencyReport, ConsistencyRequest};
pub use corpus::{CorpusBatch, CorpusOperation, CorpusRequest};
pub use explain::{ExplainOperation, ExplainRequest, Explanation};
pub use inventory::{InventoryOperation, InventoryRequest};
pub use lexicon::{LexiconBatch, LexiconOperation, LexiconRequest, SlotRequest};
pub use paradigms::{ParadigmsOperation, ParadigmsOutput, ParadigmsRequest};

use lexiforge_core::{Hash, LanguageDefinition};
use std::fmt::Write;

/// Digest of a definition, embedded in requests that depend on state so
/// the cache never serves output generated against another language.
#[must_use]
pub fn state_digest(def: &LanguageDefinition) -> String {
    match serde_json::to_vec(def) {
        Ok(bytes) => Hash::compute(&bytes).to_hex(),
        Err(err) => {
            tracing::warn!(error = %err, "definition not serializable, digest left empty");
            String::new()
        }
    }
}

/// First `{prefix}{n}` id not taken by `taken`, counting up from `start`.
pub(crate) fn next_free_id<'a, I>(prefix: &str, start: usize, taken: I) -> String
where
    I: Iterator<Item = &'a str> + Clone,
{
    let mut n = start;
    loop {
        let id = format!("{prefix}{n}");
        if !taken.clone().any(|t| t == id) {
            return id;
        }
        n += 1;
    }
}

/// Sound system summary shared by every prompt after the inventory step.
pub(crate) fn sound_summary(def: &LanguageDefinition) -> String {
    let phonology = &def.phonology;
    let inventory = &phonology.inventory;
    let mut out = String::new();
    let _ = writeln!(out, "Consonants: {}", inventory.consonants.join(" "));
    let _ = writeln!(out, "Vowels: {}", inventory.vowels.join(" "));
    if !inventory.tones.is_empty() {
        let _ = writeln!(out, "Tones: {}", inventory.tones.join(" "));
    }
    let _ = writeln!(
        out,
        "Syllable templates: {}",
        phonology.phonotactics.syllable_templates.join(", ")
    );
    let spelling: Vec<String> = phonology
        .orthography
        .iter()
        .filter(|(phoneme, grapheme)| phoneme != grapheme)
        .map(|(phoneme, grapheme)| format!("/{phoneme}/ = {grapheme}"))
        .collect();
    if !spelling.is_empty() {
        let _ = writeln!(out, "Spelling: {}", spelling.join(", "));
    }
    out
}

/// Morphology and syntax summary for lexicon and corpus prompts.
pub(crate) fn grammar_summary(def: &LanguageDefinition) -> String {
    let mut out = String::new();
    for paradigm in &def.morphology.paradigms {
        let cells: Vec<String> = paradigm
            .cells
            .iter()
            .map(|cell| {
                let features: Vec<String> =
                    cell.features.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{} {}", features.join(","), cell.affix)
            })
            .collect();
        let _ = writeln!(
            out,
            "Paradigm {} ({}): {}",
            paradigm.id,
            paradigm.pos,
            cells.join("; ")
        );
    }
    let order = def.syntax.word_order.letters().unwrap_or("free");
    let _ = writeln!(out, "Basic word order: {order}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_state_digest_tracks_content() {
        let mut def = testing::base_state();
        let before = state_digest(&def);
        assert_eq!(before, state_digest(&def));
        def.name.push('x');
        assert_ne!(before, state_digest(&def));
        assert_eq!(before.len(), 64);
    }

    #[test]
    fn test_next_free_id() {
        let taken = ["w1", "w2", "w4"];
        assert_eq!(next_free_id("w", 1, taken.iter().copied()), "w3");
        assert_eq!(next_free_id("w", 4, taken.iter().copied()), "w5");
    }

    #[test]
    fn test_summaries() {
        let def = testing::base_state();
        let sound = sound_summary(&def);
        assert!(sound.contains("Vowels: a i u"));
        assert!(sound.contains("/ŋ/ = ng"));
        let grammar = grammar_summary(&def);
        assert!(grammar.contains("Paradigm noun-number (noun): number=plural -li"));
        assert!(grammar.contains("Basic word order: SOV"));
    }
}
