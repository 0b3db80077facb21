//! Morphology paradigms with a syntax sketch.

use super::sound_summary;
use crate::operation::GatedOperation;
use lexiforge_core::{LanguageDefinition, Morphology, Syntax};
use lexiforge_validate::ValidationPass;
use serde::{Deserialize, Serialize};

/// Request for morphology and syntax
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadigmsRequest {
    /// Language name
    pub name: String,
    /// Digest of the language the grammar is built on
    pub basis: String,
}

/// Morphology and syntax produced together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParadigmsOutput {
    /// Categories, paradigms, derivations, alternations
    pub morphology: Morphology,
    /// Word order and phrase structure
    pub syntax: Syntax,
}

/// Generates grammatical categories, paradigms and the syntax sketch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParadigmsOperation;

impl GatedOperation for ParadigmsOperation {
    type Request = ParadigmsRequest;
    type Output = ParadigmsOutput;

    fn name(&self) -> &'static str {
        "paradigms"
    }

    fn passes(&self) -> &'static [ValidationPass] {
        &[
            ValidationPass::Morphological,
            ValidationPass::Syntactic,
            ValidationPass::CrossModule,
        ]
    }

    fn prompt(&self, request: &ParadigmsRequest, base: &LanguageDefinition) -> String {
        format!(
            r#"Design the grammar of "{name}". Its sound system:
{sounds}
Return JSON of this shape:
{{
  "morphology": {{
    "typology": "agglutinative",
    "categories": [{{"name": "number", "values": ["singular", "plural"]}}],
    "paradigms": [{{"id": "noun-number", "name": "Noun number", "pos": "noun",
                    "categories": ["number"],
                    "cells": [{{"features": {{"number": "plural"}}, "affix": "-li"}}]}}],
    "derivations": [{{"id": "agent", "name": "agentive", "affix": "-ka",
                      "fromPos": "verb", "toPos": "noun", "gloss": "one who"}}],
    "alternations": []
  }},
  "syntax": {{
    "wordOrder": "SOV",
    "constituents": ["S", "NP", "VP", "N", "V"],
    "phraseStructure": ["S -> NP VP", "NP -> N", "VP -> (NP) V"],
    "clauseTypes": [{{"name": "declarative", "pattern": "S O V"}}]
  }}
}}

Affixes use only the phonemes above: "ka-" is a prefix, "-ta" a suffix.
Every category a paradigm uses must be declared, and every label in a
phrase-structure rule must be listed in constituents."#,
            name = request.name,
            sounds = sound_summary(base)
        )
    }

    fn candidate(&self, base: &LanguageDefinition, output: &ParadigmsOutput) -> LanguageDefinition {
        LanguageDefinition {
            morphology: output.morphology.clone(),
            syntax: output.syntax.clone(),
            ..base.clone()
        }
    }

    fn merge(&self, state: &mut LanguageDefinition, output: ParadigmsOutput) {
        state.morphology = output.morphology;
        state.syntax = output.syntax;
    }

    fn describe(&self, output: &ParadigmsOutput) -> String {
        format!(
            "{} paradigm(s), {} derivation(s), word order {}",
            output.morphology.paradigms.len(),
            output.morphology.derivations.len(),
            output.syntax.word_order.letters().unwrap_or("free")
        )
    }
}
