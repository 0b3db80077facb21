//! LEXIFORGE Runtime
//!
//! Turns untrusted model output into validated language modules.
//!
//! - [`client`]: the model transport seam, transport retries, a scripted client
//! - [`operation`]: what a gated operation is and how raw text is decoded
//! - [`operations`]: the six operation kinds
//! - [`executor`]: cache check, then call, parse, and validate with feedback
//! - [`pipeline`]: the orchestrator that grows a language step by step
//! - [`events`]: progress events and the run handle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod events;
pub mod executor;
pub mod operation;
pub mod operations;
pub mod pipeline;

// Re-exports
pub use client::{
    ModelClient, ModelRequest, ModelResponse, RetryPolicy, RetryingClient, ScriptedClient,
    TransportError,
};
pub use events::{PipelineEvent, PipelineRun, StepSummary};
pub use executor::{ExecutorConfig, GatedExecutor, OperationError, OperationResult};
pub use operation::{Attempt, GatedOperation, ParseError, extract_json, parse_json};
pub use pipeline::{
    Orchestrator, PipelineConfig, PipelineError, PipelineRequest, PipelineResult,
    plan_lexicon_batch,
};

#[cfg(test)]
pub(crate) mod testing {
    use crate::operations::ParadigmsOutput;
    use lexiforge_core::{
        ClauseType, GrammaticalCategory, LanguageDefinition, Morphology, Paradigm, ParadigmCell,
        PartOfSpeech, PhonemeInventory, Phonology, Phonotactics, Syntax, WordOrder,
    };
    use serde_json::json;

    const CONSONANTS: [&str; 7] = ["p", "t", "k", "m", "n", "s", "l"];
    const VOWELS: [&str; 3] = ["a", "i", "u"];

    /// Tala with sounds and grammar but no words yet.
    pub fn base_state() -> LanguageDefinition {
        let inventory =
            PhonemeInventory::new(["p", "t", "k", "m", "n", "s", "l", "ŋ"], ["a", "i", "u"]);
        let orthography = inventory
            .segments()
            .map(|(s, _)| {
                let g = if s == "ŋ" { "ng" } else { s };
                (s.to_string(), g.to_string())
            })
            .collect();

        LanguageDefinition {
            id: "tala".into(),
            name: "Tala".into(),
            phonology: Phonology {
                inventory,
                phonotactics: Phonotactics::with_templates(["CV(C)", "V"]),
                orthography,
            },
            morphology: Morphology {
                categories: vec![GrammaticalCategory {
                    name: "number".into(),
                    values: vec!["singular".into(), "plural".into()],
                }],
                paradigms: vec![Paradigm {
                    id: "noun-number".into(),
                    name: "Noun number".into(),
                    pos: PartOfSpeech::Noun,
                    categories: vec!["number".into()],
                    cells: vec![ParadigmCell {
                        features: [("number".to_string(), "plural".to_string())]
                            .into_iter()
                            .collect(),
                        affix: "-li".into(),
                    }],
                }],
                ..Morphology::default()
            },
            syntax: Syntax {
                word_order: WordOrder::Sov,
                constituents: ["S", "NP", "VP", "N", "V", "Pron"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                phrase_structure: vec![
                    "S -> NP VP".into(),
                    "NP -> N | Pron".into(),
                    "VP -> (NP) V".into(),
                ],
                clause_types: vec![ClauseType {
                    name: "declarative".into(),
                    pattern: "S O V".into(),
                }],
            },
            lexicon: Vec::new(),
            corpus: Vec::new(),
        }
    }

    /// Model answer for the inventory step
    pub fn phonology_json() -> String {
        serde_json::to_string(&base_state().phonology).unwrap()
    }

    /// Model answer for the paradigms step
    pub fn paradigms_json() -> String {
        let state = base_state();
        serde_json::to_string(&ParadigmsOutput {
            morphology: state.morphology,
            syntax: state.syntax,
        })
        .unwrap()
    }

    /// `n` well-formed nouns with ids `w{start+1}..`; the lemma depends only
    /// on the global index, so overlapping ranges repeat lemmas.
    pub fn lexicon_json(start: usize, n: usize) -> String {
        let syllables: Vec<String> = CONSONANTS
            .iter()
            .flat_map(|c| VOWELS.iter().map(move |v| format!("{c}{v}")))
            .collect();
        let entries: Vec<_> = (start..start + n)
            .map(|i| {
                let first = &syllables[i % syllables.len()];
                let second = &syllables[(i / syllables.len()) % syllables.len()];
                json!({
                    "id": format!("w{}", i + 1),
                    "lemma": format!("{first}{second}"),
                    "ipa": format!("/{first}.{second}/"),
                    "pos": "noun",
                    "gloss": format!("thing {i}"),
                })
            })
            .collect();
        json!({ "entries": entries }).to_string()
    }

    /// Model answer for the corpus step
    pub fn corpus_json() -> String {
        json!({
            "sentences": [{
                "id": "s1",
                "text": "papa tapa",
                "ipa": "/pa.pa ta.pa/",
                "gloss": "thing thing",
                "translation": "A thing, a thing.",
                "constituentOrder": "SOV",
            }]
        })
        .to_string()
    }
}
