//! Cross-module pass: references between modules and lexicon integrity.

use crate::ValidatorConfig;
use crate::rules::*;
use indexmap::{IndexMap, IndexSet};
use lexiforge_core::{
    Affix, CoverageReport, IssueModule, LanguageDefinition, LexEntry, PartOfSpeech,
    ValidationIssue,
};
use lexiforge_phonology::{TokenizeError, Tokenizer};
use std::collections::HashMap;

/// Parts of speech every lexicon must contain.
const CORE_POS: [PartOfSpeech; 2] = [PartOfSpeech::Pronoun, PartOfSpeech::Numeral];

/// Run the cross-module pass
#[must_use]
pub fn check(def: &LanguageDefinition, config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_affix_inventory(def, &mut issues);
    check_orthography_complete(def, &mut issues);
    check_categories(def, &mut issues);
    check_vocabulary(def, config, &mut issues);
    check_lexicon(def, &mut issues);
    issues
}

fn check_affix_inventory(def: &LanguageDefinition, issues: &mut Vec<ValidationIssue>) {
    let tokenizer = Tokenizer::new(&def.phonology.inventory);
    let mut unknown: IndexMap<&str, IndexSet<String>> = IndexMap::new();
    for (owner, notation) in def.morphology.affixes() {
        let affix = Affix::parse(notation);
        if affix.form.is_empty() {
            continue;
        }
        if let Err(TokenizeError::UnknownSymbol { symbol, .. }) = tokenizer.tokenize(&affix.form) {
            unknown.entry(owner).or_default().insert(symbol);
        }
    }
    for (owner, symbols) in unknown {
        let list: Vec<&str> = symbols.iter().map(String::as_str).collect();
        issues.push(
            ValidationIssue::error(
                XMOD_AFFIX_INVENTORY,
                IssueModule::CrossModule,
                format!(
                    "affixes of `{owner}` use symbols outside the phoneme inventory: {}",
                    list.join(", ")
                ),
            )
            .with_entity(owner),
        );
    }
}

fn check_orthography_complete(def: &LanguageDefinition, issues: &mut Vec<ValidationIssue>) {
    for (phoneme, _) in def.phonology.inventory.segments() {
        if !def.phonology.orthography.contains_key(phoneme) {
            issues.push(
                ValidationIssue::error(
                    XMOD_ORTHOGRAPHY_INCOMPLETE,
                    IssueModule::CrossModule,
                    format!("phoneme `{phoneme}` cannot be written: orthography has no grapheme for it"),
                )
                .with_entity(phoneme),
            );
        }
    }
}

fn check_categories(def: &LanguageDefinition, issues: &mut Vec<ValidationIssue>) {
    let morphology = &def.morphology;
    for paradigm in &morphology.paradigms {
        let mut reported = IndexSet::new();
        let names = paradigm
            .categories
            .iter()
            .chain(paradigm.cells.iter().flat_map(|c| c.features.keys()));
        for name in names {
            if morphology.category(name).is_none() && reported.insert(name.as_str()) {
                issues.push(
                    ValidationIssue::error(
                        XMOD_UNDECLARED_CATEGORY,
                        IssueModule::CrossModule,
                        format!("paradigm `{}` uses undeclared category `{name}`", paradigm.id),
                    )
                    .with_entity(paradigm.id.as_str()),
                );
            }
        }
        for cell in &paradigm.cells {
            for (name, value) in &cell.features {
                let Some(category) = morphology.category(name) else {
                    continue;
                };
                if !category.values.is_empty() && !category.values.contains(value) {
                    issues.push(
                        ValidationIssue::warning(
                            XMOD_UNDECLARED_VALUE,
                            IssueModule::CrossModule,
                            format!(
                                "paradigm `{}` uses `{name}={value}`, not a declared value of `{name}`",
                                paradigm.id
                            ),
                        )
                        .with_entity(paradigm.id.as_str()),
                    );
                }
            }
        }
    }

    for entry in &def.lexicon {
        let Some(id) = &entry.paradigm_id else {
            continue;
        };
        if morphology.paradigm(id).is_none() {
            issues.push(
                ValidationIssue::error(
                    XMOD_UNKNOWN_PARADIGM,
                    IssueModule::CrossModule,
                    format!("`{}` refers to unknown paradigm `{id}`", entry.lemma),
                )
                .with_entity(entry.id.as_str()),
            );
        }
    }
}

fn check_vocabulary(
    def: &LanguageDefinition,
    config: &ValidatorConfig,
    issues: &mut Vec<ValidationIssue>,
) {
    if def.lexicon.len() < config.min_vocabulary {
        issues.push(ValidationIssue::warning(
            XMOD_MIN_VOCABULARY,
            IssueModule::CrossModule,
            format!(
                "lexicon has {} entries, fewer than the minimum of {}",
                def.lexicon.len(),
                config.min_vocabulary
            ),
        ));
    }
    if def.lexicon.is_empty() {
        return;
    }

    let coverage = CoverageReport::compute(&def.lexicon);
    for pos in CORE_POS {
        if def.lexicon.iter().any(|e| e.pos == pos) {
            continue;
        }
        let unfilled: Vec<&str> = coverage
            .missing
            .iter()
            .filter(|slot| slot.pos == pos)
            .map(|slot| slot.gloss)
            .collect();
        issues.push(ValidationIssue::warning(
            XMOD_MISSING_CORE_POS,
            IssueModule::CrossModule,
            format!(
                "lexicon has no {pos}; unfilled core slots: {}",
                unfilled.join(", ")
            ),
        ));
    }
}

fn entity_of(entry: &LexEntry, index: usize) -> String {
    if entry.id.trim().is_empty() {
        format!("lexicon#{index}")
    } else {
        entry.id.clone()
    }
}

fn check_lexicon(def: &LanguageDefinition, issues: &mut Vec<ValidationIssue>) {
    let mut ids: HashMap<&str, usize> = HashMap::new();
    let mut lemmas: HashMap<&str, &str> = HashMap::new();

    for (index, entry) in def.lexicon.iter().enumerate() {
        let entity = entity_of(entry, index);

        let fields = [
            ("id", &entry.id),
            ("lemma", &entry.lemma),
            ("ipa", &entry.ipa),
            ("gloss", &entry.gloss),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                issues.push(
                    ValidationIssue::error(
                        LEX_MISSING_FIELD,
                        IssueModule::Lexicon,
                        format!("entry {entity} is missing `{field}`"),
                    )
                    .with_entity(entity.as_str()),
                );
            }
        }

        let first = if entry.id.trim().is_empty() {
            None
        } else {
            ids.insert(entry.id.as_str(), index)
        };
        if let Some(first) = first {
            issues.push(
                ValidationIssue::error(
                    LEX_DUPLICATE_ID,
                    IssueModule::Lexicon,
                    format!(
                        "id `{}` is used by entries #{first} and #{index}",
                        entry.id
                    ),
                )
                .with_entity(entity.as_str()),
            );
        }

        let other = if entry.lemma.trim().is_empty() {
            None
        } else {
            lemmas.insert(entry.lemma.as_str(), entry.id.as_str())
        };
        if let Some(other) = other {
            issues.push(
                ValidationIssue::warning(
                    LEX_DUPLICATE_FORM,
                    IssueModule::Lexicon,
                    format!("`{}` is spelled the same as entry `{other}`", entry.lemma),
                )
                .with_entity(entity.as_str()),
            );
        }

        if !entry.senses.is_empty() {
            let numbered = entry
                .senses
                .iter()
                .enumerate()
                .all(|(i, s)| s.index as usize == i + 1);
            let glossed = entry.senses.iter().all(|s| !s.gloss.trim().is_empty());
            if !numbered || !glossed {
                issues.push(
                    ValidationIssue::error(
                        LEX_MALFORMED_SENSES,
                        IssueModule::Lexicon,
                        format!(
                            "senses of `{}` must be numbered 1..{} in order, each with a gloss",
                            entry.lemma,
                            entry.senses.len()
                        ),
                    )
                    .with_entity(entity.as_str()),
                );
            }
        }

        for derived in &entry.derived_forms {
            if def.morphology.derivation(&derived.rule_id).is_none() {
                issues.push(
                    ValidationIssue::error(
                        LEX_UNKNOWN_DERIVATION,
                        IssueModule::Lexicon,
                        format!(
                            "derived form /{}/ of `{}` cites unknown rule `{}`",
                            derived.ipa, entry.lemma, derived.rule_id
                        ),
                    )
                    .with_entity(entity.as_str()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::tala;
    use lexiforge_core::{DerivationalRule, DerivedForm, Sense, Severity};

    fn config() -> ValidatorConfig {
        ValidatorConfig::default().with_min_vocabulary(4)
    }

    fn rule_ids(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.rule_id.as_str()).collect()
    }

    #[test]
    fn test_clean_fixture() {
        assert!(check(&tala(), &config()).is_empty());
    }

    #[test]
    fn test_min_vocabulary_is_warning() {
        let issues = check(&tala(), &ValidatorConfig::default());
        assert_eq!(rule_ids(&issues), vec![XMOD_MIN_VOCABULARY]);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_affix_inventory_aggregated_per_owner() {
        let mut def = tala();
        def.morphology.paradigms[0].cells[0].affix = "-zo".into();
        let mut cell = def.morphology.paradigms[0].cells[0].clone();
        cell.affix = "-xa".into();
        def.morphology.paradigms[0].cells.push(cell);

        let issues = check(&def, &config());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, XMOD_AFFIX_INVENTORY);
        assert!(issues[0].message.ends_with("z, x"));
    }

    #[test]
    fn test_orthography_gap_is_error() {
        let mut def = tala();
        def.phonology.orthography.shift_remove("ŋ");
        let issues = check(&def, &config());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, XMOD_ORTHOGRAPHY_INCOMPLETE);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_undeclared_category_and_value() {
        let mut def = tala();
        def.morphology.paradigms[0].categories.push("case".into());
        def.morphology.paradigms[0].cells[0]
            .features
            .insert("number".into(), "dual".into());
        let issues = check(&def, &config());
        let ids = rule_ids(&issues);
        assert_eq!(ids, vec![XMOD_UNDECLARED_CATEGORY, XMOD_UNDECLARED_VALUE]);
    }

    #[test]
    fn test_unknown_paradigm_reference() {
        let mut def = tala();
        def.lexicon[2].paradigm_id = Some("verb-tense".into());
        assert_eq!(rule_ids(&check(&def, &config())), vec![XMOD_UNKNOWN_PARADIGM]);
    }

    #[test]
    fn test_missing_core_pos() {
        let mut def = tala();
        def.lexicon.remove(0);
        let issues = check(&def, &config().with_min_vocabulary(0));
        assert_eq!(rule_ids(&issues), vec![XMOD_MISSING_CORE_POS]);
        assert!(issues[0].message.contains("pronoun"));
        assert!(issues[0].message.contains("you"));
    }

    #[test]
    fn test_lexicon_integrity() {
        let mut def = tala();
        let mut dup = def.lexicon[2].clone();
        dup.gloss = String::new();
        def.lexicon.push(dup);
        def.lexicon[1].senses = vec![
            Sense {
                index: 2,
                gloss: "single".into(),
            },
        ];
        def.lexicon[3] = def.lexicon[3].clone().with_derived(DerivedForm {
            rule_id: "nominalizer".into(),
            lemma: "kangali".into(),
            ipa: "/kaŋali/".into(),
            gloss: "sight".into(),
        });

        let issues = check(&def, &config());
        let ids = rule_ids(&issues);
        assert!(ids.contains(&LEX_MISSING_FIELD));
        assert!(ids.contains(&LEX_DUPLICATE_ID));
        assert!(ids.contains(&LEX_DUPLICATE_FORM));
        assert!(ids.contains(&LEX_MALFORMED_SENSES));
        assert!(ids.contains(&LEX_UNKNOWN_DERIVATION));
        let form = issues.iter().find(|i| i.rule_id == LEX_DUPLICATE_FORM).unwrap();
        assert_eq!(form.severity, Severity::Warning);
    }

    #[test]
    fn test_derivation_reference_resolves() {
        let mut def = tala();
        def.morphology.derivations.push(DerivationalRule {
            id: "nominalizer".into(),
            name: "nominalizer".into(),
            affix: "-li".into(),
            from_pos: PartOfSpeech::Verb,
            to_pos: PartOfSpeech::Noun,
            gloss: "act of".into(),
        });
        def.lexicon[3] = def.lexicon[3].clone().with_derived(DerivedForm {
            rule_id: "nominalizer".into(),
            lemma: "kangali".into(),
            ipa: "/kaŋali/".into(),
            gloss: "sight".into(),
        });
        assert!(check(&def, &config()).is_empty());
    }

    #[test]
    fn test_blank_id_uses_position() {
        let mut def = tala();
        def.lexicon[0].id = " ".into();
        let issues = check(&def, &config());
        assert_eq!(issues[0].entity_ref.as_deref(), Some("lexicon#0"));
    }
}
