//! On-demand explanations of a language feature.

use super::{grammar_summary, sound_summary};
use crate::operation::{GatedOperation, ParseError, parse_json};
use lexiforge_core::{LanguageDefinition, LexEntry};
use lexiforge_validate::ValidationPass;
use serde::{Deserialize, Serialize};

/// Request for an explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainRequest {
    /// What to explain, e.g. `vowel harmony`
    pub topic: String,
    /// Digest of the language being explained
    pub basis: String,
}

/// A prose explanation with illustrative words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Prose summary
    pub summary: String,
    /// Example words; each must obey the phonology
    #[serde(default)]
    pub examples: Vec<LexEntry>,
}

/// Explains one feature of the language. Never changes the language.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplainOperation;

impl GatedOperation for ExplainOperation {
    type Request = ExplainRequest;
    type Output = Explanation;

    fn name(&self) -> &'static str {
        "explain"
    }

    fn passes(&self) -> &'static [ValidationPass] {
        &[ValidationPass::Phonological]
    }

    fn prompt(&self, request: &ExplainRequest, base: &LanguageDefinition) -> String {
        format!(
            r#"Explain "{topic}" in "{name}" for a learner.
{sounds}{grammar}
Return JSON: {{"summary": "...", "examples": [{{"id": "x1", "lemma": "...", "ipa": "/.../",
"pos": "noun", "gloss": "..."}}]}}
Examples may be new words but must use only the listed phonemes."#,
            topic = request.topic,
            name = base.name,
            sounds = sound_summary(base),
            grammar = grammar_summary(base),
        )
    }

    fn parse(&self, raw: &str) -> Result<Explanation, ParseError> {
        let explanation: Explanation = parse_json(raw)?;
        if explanation.summary.trim().is_empty() {
            return Err(ParseError::Invalid("the summary is empty".into()));
        }
        Ok(explanation)
    }

    fn candidate(&self, base: &LanguageDefinition, output: &Explanation) -> LanguageDefinition {
        LanguageDefinition {
            lexicon: output.examples.clone(),
            ..base.clone()
        }
    }

    fn merge(&self, _state: &mut LanguageDefinition, _output: Explanation) {}

    fn describe(&self, output: &Explanation) -> String {
        format!("explanation with {} example(s)", output.examples.len())
    }
}
