//! Phonological pass: inventory, orthography, and word phonotactics.

use crate::rules::*;
use indexmap::IndexMap;
use lexiforge_core::{IssueModule, LanguageDefinition, ValidationIssue};
use lexiforge_phonology::{TokenizeError, WordAnalyzer};
use std::collections::HashSet;

/// Run the phonological pass
#[must_use]
pub fn check(def: &LanguageDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_inventory(def, &mut issues);
    check_orthography(def, &mut issues);

    let analyzer = WordAnalyzer::new(&def.phonology);
    check_templates(def, &analyzer, &mut issues);
    check_forms(def, &analyzer, &mut issues);
    issues
}

fn check_inventory(def: &LanguageDefinition, issues: &mut Vec<ValidationIssue>) {
    let inventory = &def.phonology.inventory;
    if inventory.consonants.is_empty() {
        issues.push(ValidationIssue::error(
            PHON_EMPTY_CONSONANTS,
            IssueModule::Phonology,
            "consonant inventory is empty",
        ));
    }
    if inventory.vowels.is_empty() {
        issues.push(ValidationIssue::error(
            PHON_EMPTY_VOWELS,
            IssueModule::Phonology,
            "vowel inventory is empty",
        ));
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for (symbol, _) in inventory.segments() {
        if !seen.insert(symbol) && reported.insert(symbol) {
            issues.push(
                ValidationIssue::error(
                    PHON_DUPLICATE_PHONEME,
                    IssueModule::Phonology,
                    format!("phoneme `{symbol}` is listed more than once in the inventory"),
                )
                .with_entity(symbol),
            );
        }
    }

    let phonotactics = &def.phonology.phonotactics;
    for rule in &phonotactics.allophony {
        if !inventory.contains(&rule.phoneme) {
            issues.push(
                ValidationIssue::error(
                    PHON_ALLOPHONY_UNKNOWN,
                    IssueModule::Phonology,
                    format!(
                        "allophony rule `{} -> {}` names a phoneme not in the inventory",
                        rule.phoneme, rule.allophone
                    ),
                )
                .with_entity(rule.phoneme.as_str()),
            );
        }
    }

    let clusters = phonotactics
        .onset_clusters
        .iter()
        .map(|c| ("onset", c))
        .chain(phonotactics.coda_clusters.iter().map(|c| ("coda", c)));
    for (position, cluster) in clusters {
        let unknown: Vec<&str> = cluster
            .iter()
            .map(String::as_str)
            .filter(|s| !inventory.contains(s))
            .collect();
        if !unknown.is_empty() {
            issues.push(ValidationIssue::error(
                PHON_CLUSTER_UNKNOWN,
                IssueModule::Phonology,
                format!(
                    "{position} cluster `{}` uses symbols not in the inventory: {}",
                    cluster.concat(),
                    unknown.join(", ")
                ),
            ));
        }
    }
}

fn check_orthography(def: &LanguageDefinition, issues: &mut Vec<ValidationIssue>) {
    let phonology = &def.phonology;
    let inventory = &phonology.inventory;

    for (phoneme, _) in inventory.segments() {
        if !phonology.orthography.contains_key(phoneme) {
            issues.push(
                ValidationIssue::warning(
                    ORTH_MISSING_GRAPHEME,
                    IssueModule::WritingSystem,
                    format!("phoneme `{phoneme}` has no grapheme"),
                )
                .with_entity(phoneme),
            );
        }
    }

    let mut by_grapheme: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (phoneme, grapheme) in &phonology.orthography {
        if !inventory.contains(phoneme) {
            issues.push(ValidationIssue::error(
                ORTH_UNKNOWN_PHONEME,
                IssueModule::WritingSystem,
                format!("grapheme `{grapheme}` maps to `{phoneme}`, which is not in the inventory"),
            ));
        }
        if grapheme.trim().is_empty() {
            issues.push(ValidationIssue::error(
                ORTH_EMPTY_GRAPHEME,
                IssueModule::WritingSystem,
                format!("phoneme `{phoneme}` maps to an empty grapheme"),
            ));
            continue;
        }
        by_grapheme.entry(grapheme).or_default().push(phoneme);
    }
    for (grapheme, phonemes) in by_grapheme {
        if phonemes.len() > 1 {
            issues.push(ValidationIssue::warning(
                ORTH_COLLISION,
                IssueModule::WritingSystem,
                format!(
                    "grapheme `{grapheme}` is shared by {}; spelling is ambiguous",
                    phonemes.join(", ")
                ),
            ));
        }
    }
}

fn check_templates(
    def: &LanguageDefinition,
    analyzer: &WordAnalyzer,
    issues: &mut Vec<ValidationIssue>,
) {
    for err in analyzer.template_errors() {
        issues.push(ValidationIssue::error(
            PHON_TEMPLATE_MALFORMED,
            IssueModule::Phonology,
            err.to_string(),
        ));
    }
    if def.phonology.phonotactics.syllable_templates.is_empty() {
        issues.push(ValidationIssue::error(
            PHON_NO_TEMPLATES,
            IssueModule::Phonology,
            "no syllable templates are declared",
        ));
    }
}

fn check_forms(def: &LanguageDefinition, analyzer: &WordAnalyzer, issues: &mut Vec<ValidationIssue>) {
    let phonotactics = &def.phonology.phonotactics;
    for entry in &def.lexicon {
        check_form(analyzer, &entry.id, &entry.lemma, &entry.ipa, issues, |analysis, issues| {
            check_clusters(phonotactics, &entry.id, analysis, issues);
        });
        for derived in &entry.derived_forms {
            let label = if derived.lemma.is_empty() {
                &entry.lemma
            } else {
                &derived.lemma
            };
            check_form(analyzer, &entry.id, label, &derived.ipa, issues, |_, _| {});
        }
    }
}

fn check_form(
    analyzer: &WordAnalyzer,
    entity: &str,
    label: &str,
    ipa: &str,
    issues: &mut Vec<ValidationIssue>,
    extra: impl FnOnce(&lexiforge_phonology::WordAnalysis, &mut Vec<ValidationIssue>),
) {
    match analyzer.analyze(ipa) {
        Ok(analysis) => {
            for bad in analysis.violations() {
                issues.push(
                    ValidationIssue::error(
                        PHON_TEMPLATE_MISMATCH,
                        IssueModule::Phonology,
                        format!(
                            "`{label}` /{}/: syllable `{}` ({}) matches none of {}",
                            analysis.syllabified(),
                            bad.syllable.text(),
                            bad.skeleton,
                            analyzer.templates().describe()
                        ),
                    )
                    .with_entity(entity),
                );
            }
            extra(&analysis, issues);
        }
        // Blank forms are reported as missing fields by the cross-module pass.
        Err(TokenizeError::Empty) if ipa.trim().is_empty() => {}
        Err(TokenizeError::Empty) => issues.push(
            ValidationIssue::error(
                PHON_EMPTY_FORM,
                IssueModule::Phonology,
                format!("`{label}` has no phonological content in `{ipa}`"),
            )
            .with_entity(entity),
        ),
        Err(err @ TokenizeError::UnknownSymbol { .. }) => issues.push(
            ValidationIssue::error(
                PHON_UNKNOWN_SYMBOL,
                IssueModule::Phonology,
                format!("`{label}`: {err}"),
            )
            .with_entity(entity),
        ),
    }
}

fn check_clusters(
    phonotactics: &lexiforge_core::Phonotactics,
    entity: &str,
    analysis: &lexiforge_phonology::WordAnalysis,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut reported = HashSet::new();
    for parse in &analysis.syllables {
        let syllable = &parse.syllable;
        let checks = [
            ("onset", &syllable.onset, &phonotactics.onset_clusters),
            ("coda", &syllable.coda, &phonotactics.coda_clusters),
        ];
        for (position, cluster, declared) in checks {
            if cluster.len() < 2 || declared.is_empty() || declared.contains(cluster) {
                continue;
            }
            let text = cluster.concat();
            if reported.insert((position, text.clone())) {
                issues.push(
                    ValidationIssue::warning(
                        PHON_CLUSTER_UNDECLARED,
                        IssueModule::Phonology,
                        format!("{position} cluster `{text}` in /{}/ is not declared", analysis.syllabified()),
                    )
                    .with_entity(entity),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::tala;
    use lexiforge_core::{AllophonyRule, DerivedForm, LexEntry, PartOfSpeech, Severity};

    fn rule_ids(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule_id.as_str()).collect()
    }

    #[test]
    fn test_clean_fixture() {
        assert!(check(&tala()).is_empty());
    }

    #[test]
    fn test_empty_inventory_sets() {
        let mut def = tala();
        def.phonology.inventory.consonants.clear();
        def.phonology.inventory.vowels.clear();
        let issues = check(&def);
        let ids = rule_ids(&issues);
        assert!(ids.contains(&PHON_EMPTY_CONSONANTS));
        assert!(ids.contains(&PHON_EMPTY_VOWELS));
    }

    #[test]
    fn test_duplicate_across_sets_reported_once() {
        let mut def = tala();
        def.phonology.inventory.vowels.push("p".into());
        def.phonology.inventory.tones.push("p".into());
        let issues = check(&def);
        let dups: Vec<_> = issues
            .iter()
            .filter(|i| i.rule_id == PHON_DUPLICATE_PHONEME)
            .collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].entity_ref.as_deref(), Some("p"));
    }

    #[test]
    fn test_orthography_checks() {
        let mut def = tala();
        def.phonology.orthography.insert("x".into(), "x".into());
        def.phonology.orthography.insert("k".into(), "p".into());
        let issues = check(&def);
        let ids = rule_ids(&issues);
        assert!(ids.contains(&ORTH_UNKNOWN_PHONEME));
        assert!(ids.contains(&ORTH_COLLISION));
        let collision = issues.iter().find(|i| i.rule_id == ORTH_COLLISION).unwrap();
        assert_eq!(collision.severity, Severity::Warning);
    }

    #[test]
    fn test_template_mismatch_names_syllable_and_templates() {
        let mut def = tala();
        def.phonology.phonotactics.syllable_templates = vec!["CV".into()];
        let issues = check(&def);
        let mismatch = issues
            .iter()
            .find(|i| i.rule_id == PHON_TEMPLATE_MISMATCH)
            .unwrap();
        assert_eq!(mismatch.entity_ref.as_deref(), Some("w3"));
        assert!(mismatch.message.contains("pas"));
        assert!(mismatch.message.contains("CVC"));
        assert!(mismatch.message.contains("CV"));
    }

    #[test]
    fn test_malformed_and_missing_templates() {
        let mut def = tala();
        def.phonology.phonotactics.syllable_templates = vec!["C(V)(C)".into()];
        assert!(rule_ids(&check(&def)).contains(&PHON_TEMPLATE_MALFORMED));

        def.phonology.phonotactics.syllable_templates.clear();
        assert!(rule_ids(&check(&def)).contains(&PHON_NO_TEMPLATES));
    }

    #[test]
    fn test_unknown_symbol_in_derived_form() {
        let mut def = tala();
        def.lexicon[0] = def.lexicon[0].clone().with_derived(DerivedForm {
            rule_id: "x".into(),
            lemma: "mixo".into(),
            ipa: "/mixo/".into(),
            gloss: String::new(),
        });
        let issues = check(&def);
        let unknown = issues
            .iter()
            .find(|i| i.rule_id == PHON_UNKNOWN_SYMBOL)
            .unwrap();
        assert!(unknown.message.contains("mixo"));
        assert_eq!(unknown.entity_ref.as_deref(), Some("w1"));
    }

    #[test]
    fn test_blank_form_left_to_cross_module() {
        let mut def = tala();
        def.lexicon.push(LexEntry::new("w9", "zz", "  ", PartOfSpeech::Noun, "thing"));
        assert!(check(&def).is_empty());

        def.lexicon[4].ipa = "/./".into();
        assert_eq!(rule_ids(&check(&def)), vec![PHON_EMPTY_FORM]);
    }

    #[test]
    fn test_allophony_and_clusters() {
        let mut def = tala();
        def.phonology.phonotactics.allophony.push(AllophonyRule {
            phoneme: "q".into(),
            allophone: "ʔ".into(),
            environment: "_#".into(),
            position: None,
        });
        def.phonology.phonotactics.onset_clusters =
            vec![vec!["p".into(), "l".into()], vec!["z".into(), "l".into()]];
        def.phonology.phonotactics.syllable_templates = vec!["CCV".into(), "CV(C)".into()];
        def.lexicon.push(LexEntry::new("w9", "tla", "/tla/", PartOfSpeech::Noun, "rope"));

        let issues = check(&def);
        let ids = rule_ids(&issues);
        assert!(ids.contains(&PHON_ALLOPHONY_UNKNOWN));
        assert!(ids.contains(&PHON_CLUSTER_UNKNOWN));
        let undeclared = issues
            .iter()
            .find(|i| i.rule_id == PHON_CLUSTER_UNDECLARED)
            .unwrap();
        assert_eq!(undeclared.entity_ref.as_deref(), Some("w9"));
    }
}
