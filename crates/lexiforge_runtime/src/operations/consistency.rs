//! Final consistency review.

use super::sound_summary;
use crate::operation::GatedOperation;
use lexiforge_core::{LanguageDefinition, LexEntry};
use lexiforge_validate::ValidationPass;
use serde::{Deserialize, Serialize};

/// Request for a consistency review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyRequest {
    /// Issues the validator currently reports, as feedback lines
    pub issues: Vec<String>,
    /// Digest of the language under review
    pub basis: String,
}

/// Review notes and replacement entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    /// Observations for the designer
    #[serde(default)]
    pub notes: Vec<String>,
    /// Corrected entries; each replaces the entry with the same id
    #[serde(default)]
    pub lexicon_fixes: Vec<LexEntry>,
}

/// Reviews the finished language and proposes lexicon corrections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyOperation;

impl GatedOperation for ConsistencyOperation {
    type Request = ConsistencyRequest;
    type Output = ConsistencyReport;

    fn name(&self) -> &'static str {
        "consistency"
    }

    fn passes(&self) -> &'static [ValidationPass] {
        &[ValidationPass::Phonological, ValidationPass::CrossModule]
    }

    fn prompt(&self, request: &ConsistencyRequest, base: &LanguageDefinition) -> String {
        let issues = if request.issues.is_empty() {
            "(none)".to_string()
        } else {
            request.issues.join("\n")
        };
        let entries: Vec<String> = base
            .lexicon
            .iter()
            .map(|e| format!("{} {} {} {} \"{}\"", e.id, e.lemma, e.ipa, e.pos, e.gloss))
            .collect();
        format!(
            r#"Review "{name}" for internal consistency.
{sounds}
Lexicon:
{entries}

Validator findings:
{issues}

Return JSON: {{"notes": ["..."], "lexiconFixes": [{{"id": "w3", "lemma": "...", "ipa": "/.../",
"pos": "noun", "gloss": "..."}}]}}
Only include entries that need changing; keep their ids."#,
            name = base.name,
            sounds = sound_summary(base),
            entries = entries.join("\n"),
        )
    }

    fn candidate(&self, base: &LanguageDefinition, output: &ConsistencyReport) -> LanguageDefinition {
        let mut candidate = base.clone();
        apply_fixes(&mut candidate.lexicon, output.lexicon_fixes.iter().cloned());
        candidate
    }

    fn merge(&self, state: &mut LanguageDefinition, output: ConsistencyReport) {
        apply_fixes(&mut state.lexicon, output.lexicon_fixes);
    }

    fn describe(&self, output: &ConsistencyReport) -> String {
        format!(
            "{} note(s), {} lexicon fix(es)",
            output.notes.len(),
            output.lexicon_fixes.len()
        )
    }
}

/// Replace entries by id. Fixes for ids not in `lexicon` are dropped.
fn apply_fixes(lexicon: &mut [LexEntry], fixes: impl IntoIterator<Item = LexEntry>) {
    for fix in fixes {
        match lexicon.iter_mut().find(|e| e.id == fix.id) {
            Some(entry) => *entry = fix,
            None => tracing::debug!(id = %fix.id, "fix for unknown entry ignored"),
        }
    }
}
