//! Example sentence corpus.

use super::{grammar_summary, next_free_id};
use crate::operation::{GatedOperation, ParseError, parse_json};
use lexiforge_core::{CorpusSentence, LanguageDefinition};
use lexiforge_validate::ValidationPass;
use serde::{Deserialize, Serialize};

/// Request for example sentences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRequest {
    /// Sentences wanted
    pub count: usize,
    /// Digest of the language the sentences use
    pub basis: String,
}

/// Generated sentences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusBatch {
    /// New sentences
    pub sentences: Vec<CorpusSentence>,
}

/// Generates glossed example sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusOperation;

impl GatedOperation for CorpusOperation {
    type Request = CorpusRequest;
    type Output = CorpusBatch;

    fn name(&self) -> &'static str {
        "corpus"
    }

    fn passes(&self) -> &'static [ValidationPass] {
        &[ValidationPass::Syntactic]
    }

    fn prompt(&self, request: &CorpusRequest, base: &LanguageDefinition) -> String {
        let vocabulary: Vec<String> = base
            .lexicon
            .iter()
            .map(|e| format!("{} ({}, {})", e.lemma, e.pos, e.gloss))
            .collect();
        format!(
            r#"Write {count} example sentences in "{name}" using only these words:
{vocabulary}

{grammar}
Return JSON: {{"sentences": [{{"id": "s1", "text": "...", "ipa": "/.../", "gloss": "...",
"translation": "...", "constituentOrder": "SOV"}}]}}
constituentOrder lists the S, O and V actually present, in surface order."#,
            count = request.count,
            name = base.name,
            vocabulary = vocabulary.join(", "),
            grammar = grammar_summary(base),
        )
    }

    fn parse(&self, raw: &str) -> Result<CorpusBatch, ParseError> {
        let batch: CorpusBatch = parse_json(raw)?;
        if batch.sentences.is_empty() {
            return Err(ParseError::Invalid("no sentences were returned".into()));
        }
        Ok(batch)
    }

    fn candidate(&self, base: &LanguageDefinition, output: &CorpusBatch) -> LanguageDefinition {
        LanguageDefinition {
            corpus: output.sentences.clone(),
            ..base.clone()
        }
    }

    fn merge(&self, state: &mut LanguageDefinition, output: CorpusBatch) {
        for mut sentence in output.sentences {
            if state.corpus.iter().any(|s| s.id == sentence.id) {
                sentence.id = next_free_id("s", state.corpus.len() + 1, state.corpus.iter().map(|s| s.id.as_str()));
            }
            state.corpus.push(sentence);
        }
    }

    fn describe(&self, output: &CorpusBatch) -> String {
        format!("{} sentence(s)", output.sentences.len())
    }
}
