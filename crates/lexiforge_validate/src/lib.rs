//! LEXIFORGE Rule Validator
//!
//! Four independent passes over a [`LanguageDefinition`]:
//!
//! - **phonological**: inventory, orthography, and the phonotactics of every
//!   lexical form
//! - **morphological**: affix material and a bounded sample of inflected forms
//! - **syntactic**: phrase-structure labels, clause types, corpus word order
//! - **cross-module**: references between modules and lexicon integrity
//!
//! Passes never short-circuit each other and the validator never fails: a
//! call always returns a [`ValidationResult`] holding every issue found.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cross_module;
pub mod morphological;
pub mod phonological;
pub mod rules;
pub mod syntactic;

use lexiforge_core::{LanguageDefinition, ValidationResult};
use serde::{Deserialize, Serialize};

/// One of the four validation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPass {
    /// Inventory, orthography, word phonotactics
    Phonological,
    /// Affixes and inflected forms
    Morphological,
    /// Phrase structure, clause types, corpus order
    Syntactic,
    /// Cross-references and lexicon integrity
    CrossModule,
}

impl ValidationPass {
    /// All passes in execution order
    pub const ALL: [ValidationPass; 4] = [
        Self::Phonological,
        Self::Morphological,
        Self::Syntactic,
        Self::CrossModule,
    ];
}

/// Validator tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Lexicon entries whose inflected forms are re-checked
    pub morphology_sample_size: usize,
    /// Corpus sentences spot-checked for word order
    pub corpus_sample_size: usize,
    /// Lexicon size below which a warning is raised
    pub min_vocabulary: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            morphology_sample_size: 25,
            corpus_sample_size: 20,
            min_vocabulary: 50,
        }
    }
}

impl ValidatorConfig {
    /// Set the morphology sample size
    #[must_use]
    pub fn with_morphology_sample_size(mut self, n: usize) -> Self {
        self.morphology_sample_size = n;
        self
    }

    /// Set the corpus sample size
    #[must_use]
    pub fn with_corpus_sample_size(mut self, n: usize) -> Self {
        self.corpus_sample_size = n;
        self
    }

    /// Set the minimum vocabulary
    #[must_use]
    pub fn with_min_vocabulary(mut self, n: usize) -> Self {
        self.min_vocabulary = n;
        self
    }
}

/// The rule validator.
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    config: ValidatorConfig,
}

impl RuleValidator {
    /// Create a validator with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    #[must_use]
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run all four passes
    #[must_use]
    pub fn validate(&self, def: &LanguageDefinition) -> ValidationResult {
        self.validate_passes(def, &ValidationPass::ALL)
    }

    /// Run a subset of passes, in the order given
    #[must_use]
    pub fn validate_passes(
        &self,
        def: &LanguageDefinition,
        passes: &[ValidationPass],
    ) -> ValidationResult {
        let mut issues = Vec::new();
        for pass in passes {
            let found = match pass {
                ValidationPass::Phonological => phonological::check(def),
                ValidationPass::Morphological => morphological::check(def, &self.config),
                ValidationPass::Syntactic => syntactic::check(def, &self.config),
                ValidationPass::CrossModule => cross_module::check(def, &self.config),
            };
            tracing::trace!(?pass, issues = found.len(), "validation pass finished");
            issues.extend(found);
        }
        let result = ValidationResult::from_issues(issues);
        tracing::debug!(language = %def.name, summary = %result.summary(), "validated");
        result
    }
}

/// Validate with the default configuration
#[must_use]
pub fn validate(def: &LanguageDefinition) -> ValidationResult {
    RuleValidator::new().validate(def)
}

/// Up to `limit` indices spread evenly over `0..len`, always starting at 0.
pub(crate) fn sample_indices(len: usize, limit: usize) -> Vec<usize> {
    if len <= limit {
        return (0..len).collect();
    }
    (0..limit).map(|i| i * len / limit).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use indexmap::IndexMap;
    use lexiforge_core::{
        ClauseType, CorpusSentence, GrammaticalCategory, LanguageDefinition, LexEntry, Morphology,
        Paradigm, ParadigmCell, PartOfSpeech, PhonemeInventory, Phonology, Phonotactics, Syntax,
        WordOrder,
    };

    /// A small language that passes every check except minimum vocabulary.
    pub fn tala() -> LanguageDefinition {
        let inventory = PhonemeInventory::new(["p", "t", "k", "m", "n", "s", "l", "ŋ"], ["a", "i", "u"]);
        let orthography: IndexMap<String, String> = inventory
            .segments()
            .map(|(s, _)| {
                let g = if s == "ŋ" { "ng" } else { s };
                (s.to_string(), g.to_string())
            })
            .collect();

        let mut features = IndexMap::new();
        features.insert("number".to_string(), "plural".to_string());

        LanguageDefinition {
            id: "tala".into(),
            name: "Tala".into(),
            phonology: Phonology {
                inventory,
                phonotactics: Phonotactics::with_templates(["CV(C)", "V"]),
                orthography,
            },
            morphology: Morphology {
                typology: Some("agglutinative".into()),
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
                        features,
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
                phrase_structure: vec!["S -> NP VP".into(), "NP -> N | Pron".into(), "VP -> (NP) V".into()],
                clause_types: vec![ClauseType {
                    name: "declarative".into(),
                    pattern: "S O V".into(),
                }],
            },
            lexicon: vec![
                LexEntry::new("w1", "mi", "/mi/", PartOfSpeech::Pronoun, "I"),
                LexEntry::new("w2", "tu", "/tu/", PartOfSpeech::Numeral, "one"),
                LexEntry::new("w3", "pasta", "/pas.ta/", PartOfSpeech::Noun, "stone"),
                LexEntry::new("w4", "kanga", "/kaŋa/", PartOfSpeech::Verb, "see"),
            ],
            corpus: vec![CorpusSentence {
                id: "s1".into(),
                text: "mi pasta kanga".into(),
                ipa: "/mi pas.ta kaŋa/".into(),
                gloss: "I stone see".into(),
                translation: "I see a stone.".into(),
                constituent_order: Some("SOV".into()),
            }],
        }
    }
}
