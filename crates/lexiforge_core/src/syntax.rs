//! Word order, constituents, and phrase-structure rules.

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9']*)\s*(?:->|→|::=)\s*(\S.*?)\s*$")
        .expect("phrase rule pattern compiles")
});

static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\()?([A-Za-z][A-Za-z0-9']*)(\))?([*+])?$")
        .expect("phrase symbol pattern compiles")
});

/// Basic constituent order of a transitive clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordOrder {
    /// Subject-object-verb
    #[serde(rename = "SOV")]
    Sov,
    /// Subject-verb-object
    #[serde(rename = "SVO")]
    Svo,
    /// Verb-subject-object
    #[serde(rename = "VSO")]
    Vso,
    /// Verb-object-subject
    #[serde(rename = "VOS")]
    Vos,
    /// Object-verb-subject
    #[serde(rename = "OVS")]
    Ovs,
    /// Object-subject-verb
    #[serde(rename = "OSV")]
    Osv,
    /// No dominant order
    #[serde(rename = "free")]
    Free,
}

impl WordOrder {
    /// The three constituent letters in order, or `None` for free order.
    #[must_use]
    pub const fn letters(&self) -> Option<&'static str> {
        match self {
            Self::Sov => Some("SOV"),
            Self::Svo => Some("SVO"),
            Self::Vso => Some("VSO"),
            Self::Vos => Some("VOS"),
            Self::Ovs => Some("OVS"),
            Self::Osv => Some("OSV"),
            Self::Free => None,
        }
    }

    /// Check an observed constituent order such as `SV` or `OSV` against
    /// this basic order. Letters other than S, O, V are ignored, and missing
    /// constituents are allowed (intransitives). Free order accepts anything.
    #[must_use]
    pub fn agrees_with(&self, observed: &str) -> bool {
        let Some(letters) = self.letters() else {
            return true;
        };
        let mut last = None;
        for c in observed.chars().map(|c| c.to_ascii_uppercase()) {
            let Some(pos) = letters.find(c) else {
                continue;
            };
            if last.is_some_and(|prev| pos <= prev) {
                return false;
            }
            last = Some(pos);
        }
        true
    }
}

impl Default for WordOrder {
    fn default() -> Self {
        Self::Svo
    }
}

/// A named clause type with a descriptive pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseType {
    /// Name, e.g. `declarative`
    pub name: String,
    /// Pattern or description, e.g. `S O V-DECL`
    #[serde(default)]
    pub pattern: String,
}

/// Syntactic system of a language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Syntax {
    /// Basic word order
    #[serde(default)]
    pub word_order: WordOrder,
    /// Declared constituent labels (`S`, `NP`, `VP`, `N`, ...)
    #[serde(default)]
    pub constituents: Vec<String>,
    /// Phrase-structure rules as `LHS -> RHS ...` strings
    #[serde(default)]
    pub phrase_structure: Vec<String>,
    /// Clause types
    #[serde(default)]
    pub clause_types: Vec<ClauseType>,
}

/// One right-hand-side symbol of a phrase-structure rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSymbol {
    /// Constituent label
    pub label: String,
    /// Wrapped in parentheses
    pub optional: bool,
    /// Followed by `*` or `+`
    pub repeated: bool,
}

/// A parsed phrase-structure rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRule {
    /// Left-hand side label
    pub lhs: String,
    /// Right-hand side symbols; `|` alternatives are flattened
    pub rhs: Vec<RuleSymbol>,
}

impl PhraseRule {
    /// Parse `NP -> (Det) (AdjP)* N | Pron`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ParseError`] if the arrow is missing or a symbol
    /// is not a bare, parenthesized, or starred label.
    pub fn parse(rule: &str) -> CoreResult<Self> {
        let caps = RULE_RE.captures(rule).ok_or_else(|| CoreError::ParseError {
            message: format!("expected `LHS -> RHS` in rule `{}`", rule.trim()),
        })?;
        let lhs = caps[1].to_string();
        let mut rhs = Vec::new();
        for token in caps[2].split_whitespace().filter(|t| *t != "|") {
            let sym = SYMBOL_RE.captures(token).ok_or_else(|| CoreError::ParseError {
                message: format!("bad symbol `{}` in rule `{}`", token, rule.trim()),
            })?;
            let open = sym.get(1).is_some();
            let close = sym.get(3).is_some();
            if open != close {
                return Err(CoreError::ParseError {
                    message: format!("unbalanced parentheses in `{}`", token),
                });
            }
            rhs.push(RuleSymbol {
                label: sym[2].to_string(),
                optional: open,
                repeated: sym.get(4).is_some(),
            });
        }
        Ok(Self { lhs, rhs })
    }

    /// All labels referenced by the rule, left-hand side first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.lhs.as_str()).chain(self.rhs.iter().map(|s| s.label.as_str()))
    }
}
