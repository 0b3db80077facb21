//! Syntactic pass: phrase structure, clause types, and corpus word order.

use crate::rules::*;
use crate::{ValidatorConfig, sample_indices};
use lexiforge_core::{IssueModule, LanguageDefinition, PhraseRule, ValidationIssue};
use std::collections::HashSet;

/// Run the syntactic pass
#[must_use]
pub fn check(def: &LanguageDefinition, config: &ValidatorConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let syntax = &def.syntax;

    let declared: HashSet<&str> = syntax.constituents.iter().map(String::as_str).collect();
    for (index, source) in syntax.phrase_structure.iter().enumerate() {
        let rule = match PhraseRule::parse(source) {
            Ok(rule) => rule,
            Err(err) => {
                issues.push(
                    ValidationIssue::error(SYN_MALFORMED_RULE, IssueModule::Syntax, err.to_string())
                        .with_entity(format!("rule#{index}")),
                );
                continue;
            }
        };
        let mut reported = HashSet::new();
        for label in rule.labels() {
            if !declared.contains(label) && reported.insert(label) {
                issues.push(
                    ValidationIssue::error(
                        SYN_UNDECLARED_CONSTITUENT,
                        IssueModule::Syntax,
                        format!("rule `{}` uses undeclared constituent `{label}`", source.trim()),
                    )
                    .with_entity(format!("rule#{index}")),
                );
            }
        }
    }

    if syntax.clause_types.is_empty() {
        issues.push(ValidationIssue::error(
            SYN_NO_CLAUSE_TYPES,
            IssueModule::Syntax,
            "no clause types are declared",
        ));
    }

    let order = syntax.word_order;
    for index in sample_indices(def.corpus.len(), config.corpus_sample_size) {
        let sentence = &def.corpus[index];
        let Some(observed) = sentence.constituent_order.as_deref() else {
            continue;
        };
        if !order.agrees_with(observed) {
            issues.push(
                ValidationIssue::warning(
                    SYN_WORD_ORDER,
                    IssueModule::Syntax,
                    format!(
                        "sentence `{}` has order {observed}, declared basic order is {}",
                        sentence.text,
                        order.letters().unwrap_or("free")
                    ),
                )
                .with_entity(sentence.id.as_str()),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::tala;
    use lexiforge_core::WordOrder;

    fn config() -> ValidatorConfig {
        ValidatorConfig::default()
    }

    #[test]
    fn test_clean_fixture() {
        assert!(check(&tala(), &config()).is_empty());
    }

    #[test]
    fn test_undeclared_label_reported_once_per_rule() {
        let mut def = tala();
        def.syntax.phrase_structure.push("PP -> P NP P".into());
        let issues = check(&def, &config());
        let labels: Vec<_> = issues.iter().map(|i| i.message.clone()).collect();
        assert_eq!(issues.len(), 2, "{labels:?}");
        assert!(issues.iter().all(|i| i.rule_id == SYN_UNDECLARED_CONSTITUENT));
        assert_eq!(issues[0].entity_ref.as_deref(), Some("rule#3"));
    }

    #[test]
    fn test_malformed_rule() {
        let mut def = tala();
        def.syntax.phrase_structure.push("NP N".into());
        let issues = check(&def, &config());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, SYN_MALFORMED_RULE);
    }

    #[test]
    fn test_missing_clause_types() {
        let mut def = tala();
        def.syntax.clause_types.clear();
        let issues = check(&def, &config());
        assert_eq!(issues[0].rule_id, SYN_NO_CLAUSE_TYPES);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_word_order_spot_check() {
        let mut def = tala();
        def.syntax.word_order = WordOrder::Vso;
        let issues = check(&def, &config());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, SYN_WORD_ORDER);
        assert_eq!(issues[0].entity_ref.as_deref(), Some("s1"));

        def.syntax.word_order = WordOrder::Free;
        assert!(check(&def, &config()).is_empty());
    }

    #[test]
    fn test_no_corpus_no_order_check() {
        let mut def = tala();
        def.corpus.clear();
        def.syntax.word_order = WordOrder::Vos;
        assert!(check(&def, &config()).is_empty());
    }
}
