//! Morphological pass: affix material and inflected forms.

use crate::rules::*;
use crate::{ValidatorConfig, sample_indices};
use lexiforge_core::{Affix, IssueModule, LanguageDefinition, LexEntry, Paradigm, ValidationIssue};
use lexiforge_phonology::{Tokenizer, WordAnalyzer, clean_form};
use std::collections::HashSet;

/// Run the morphological pass
#[must_use]
pub fn check(def: &LanguageDefinition, config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let morphology = &def.morphology;

    let mut ids = HashSet::new();
    let owners = morphology
        .paradigms
        .iter()
        .map(|p| p.id.as_str())
        .chain(morphology.derivations.iter().map(|d| d.id.as_str()))
        .chain(morphology.alternations.iter().map(|a| a.id.as_str()));
    for id in owners {
        if !ids.insert(id) {
            issues.push(
                ValidationIssue::error(
                    MORPH_DUPLICATE_ID,
                    IssueModule::Morphology,
                    format!("morphology id `{id}` is used more than once"),
                )
                .with_entity(id),
            );
        }
    }

    for paradigm in &morphology.paradigms {
        if paradigm.cells.is_empty() {
            issues.push(
                ValidationIssue::warning(
                    MORPH_EMPTY_PARADIGM,
                    IssueModule::Morphology,
                    format!("paradigm `{}` has no cells", paradigm.id),
                )
                .with_entity(paradigm.id.as_str()),
            );
        }
    }

    let tokenizer = Tokenizer::new(&def.phonology.inventory);
    for (owner, notation) in morphology.affixes() {
        let affix = Affix::parse(notation);
        if affix.form.is_empty() {
            continue;
        }
        if let Err(err) = tokenizer.tokenize(&affix.form) {
            issues.push(
                ValidationIssue::error(
                    MORPH_AFFIX_SYMBOL,
                    IssueModule::Morphology,
                    format!("affix `{notation}` of `{owner}`: {err}"),
                )
                .with_entity(owner),
            );
        }
    }

    let analyzer = WordAnalyzer::new(&def.phonology);
    for index in sample_indices(def.lexicon.len(), config.morphology_sample_size) {
        let entry = &def.lexicon[index];
        let Some(paradigm) = paradigm_of(def, entry) else {
            continue;
        };
        if let Some(issue) = first_bad_inflection(&analyzer, entry, paradigm) {
            issues.push(issue);
        }
    }

    issues
}

fn paradigm_of<'a>(def: &'a LanguageDefinition, entry: &LexEntry) -> Option<&'a Paradigm> {
    match &entry.paradigm_id {
        Some(id) => def.morphology.paradigm(id),
        None => def.morphology.paradigm_for(entry.pos),
    }
}

/// Inflect an entry through every cell and report the first form that
/// violates the syllable templates. Forms that fail to tokenize are skipped:
/// the stem or the affix is already reported on its own.
fn first_bad_inflection(
    analyzer: &WordAnalyzer,
    entry: &LexEntry,
    paradigm: &Paradigm,
) -> Option<ValidationIssue> {
    let stem = clean_form(&entry.ipa);
    if stem.is_empty() {
        return None;
    }
    for cell in &paradigm.cells {
        let Some(form) = Affix::parse(&cell.affix).attach(&stem) else {
            continue;
        };
        let Ok(analysis) = analyzer.analyze(&form) else {
            continue;
        };
        if let Some(bad) = analysis.violations().next() {
            return Some(
                ValidationIssue::warning(
                    MORPH_INFLECTED_FORM,
                    IssueModule::Morphology,
                    format!(
                        "`{}` + `{}` ({}) gives /{}/ with syllable `{}` ({}) outside {}",
                        entry.lemma,
                        cell.affix,
                        paradigm.id,
                        analysis.syllabified(),
                        bad.syllable.text(),
                        bad.skeleton,
                        analyzer.templates().describe()
                    ),
                )
                .with_entity(entry.id.as_str()),
            );
        }
    }
    None
}
