//! Word-level analysis: tokenize, syllabify, and match templates in one call.

use crate::syllable::{Syllable, syllabify};
use crate::template::{TemplateError, TemplateSet};
use crate::tokenizer::{Token, TokenizeError, Tokenizer, clean_form};
use lexiforge_core::Phonology;
use serde::Serialize;

/// A syllable with its template match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyllableParse {
    /// The syllable
    pub syllable: Syllable,
    /// C/V skeleton
    pub skeleton: String,
    /// Source of the first matching template
    pub template: Option<String>,
    /// Whether the syllable conforms
    pub valid: bool,
}

/// Analysis of one word form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordAnalysis {
    /// Cleaned form
    pub form: String,
    /// Tokens
    pub tokens: Vec<Token>,
    /// Syllables with template matches
    pub syllables: Vec<SyllableParse>,
}

impl WordAnalysis {
    /// Check if every syllable conforms
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.syllables.iter().all(|s| s.valid)
    }

    /// Non-conforming syllables
    pub fn violations(&self) -> impl Iterator<Item = &SyllableParse> {
        self.syllables.iter().filter(|s| !s.valid)
    }

    /// Dotted syllabification, e.g. `pas.ta`
    #[must_use]
    pub fn syllabified(&self) -> String {
        self.syllables
            .iter()
            .map(|s| s.syllable.text())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Reusable analyzer built once per phonology.
#[derive(Debug, Clone)]
pub struct WordAnalyzer {
    tokenizer: Tokenizer,
    templates: TemplateSet,
    template_errors: Vec<TemplateError>,
}

impl WordAnalyzer {
    /// Build an analyzer from a phonology's inventory and templates
    #[must_use]
    pub fn new(phonology: &Phonology) -> Self {
        let (templates, template_errors) =
            TemplateSet::parse(&phonology.phonotactics.syllable_templates);
        Self {
            tokenizer: Tokenizer::new(&phonology.inventory),
            templates,
            template_errors,
        }
    }

    /// Underlying tokenizer
    #[must_use]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Valid templates
    #[must_use]
    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Templates that failed to parse
    #[must_use]
    pub fn template_errors(&self) -> &[TemplateError] {
        &self.template_errors
    }

    /// Analyze a word form.
    ///
    /// With no valid templates declared, syllables are left unconstrained
    /// and always valid; the missing templates are a separate finding.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizeError`] if the form cannot be tokenized
    pub fn analyze(&self, form: &str) -> Result<WordAnalysis, TokenizeError> {
        let tokens = self.tokenizer.tokenize(form)?;
        let syllables = syllabify(&tokens)
            .into_iter()
            .map(|syllable| {
                let skeleton = syllable.skeleton();
                let template = self.templates.find(&skeleton).map(|t| t.source().to_string());
                let valid = self.templates.is_empty() || template.is_some();
                SyllableParse {
                    syllable,
                    skeleton,
                    template,
                    valid,
                }
            })
            .collect();
        Ok(WordAnalysis {
            form: clean_form(form),
            tokens,
            syllables,
        })
    }
}
