//! Grammatical categories, inflectional paradigms, and derivation.

use crate::lexicon::PartOfSpeech;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A grammatical category such as case or tense, with its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammaticalCategory {
    /// Category name, e.g. `case`
    pub name: String,
    /// Permitted values, e.g. `nominative`, `accusative`
    #[serde(default)]
    pub values: Vec<String>,
}

/// One cell of a paradigm: a feature bundle realized by an affix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParadigmCell {
    /// Category name to value, e.g. `{"number": "plural"}`
    #[serde(default)]
    pub features: IndexMap<String, String>,
    /// Affix in hyphen notation (`ka-`, `-ta`, `-a-`, or empty for a zero morph)
    #[serde(default)]
    pub affix: String,
}

/// An inflectional paradigm for one part of speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paradigm {
    /// Stable identifier referenced from lexicon entries
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// Part of speech this paradigm inflects
    pub pos: PartOfSpeech,
    /// Category names this paradigm is built from
    #[serde(default)]
    pub categories: Vec<String>,
    /// Cells
    #[serde(default)]
    pub cells: Vec<ParadigmCell>,
}

/// A derivational rule turning one part of speech into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivationalRule {
    /// Stable identifier referenced from derived forms
    pub id: String,
    /// Human-readable name, e.g. `agentive`
    #[serde(default)]
    pub name: String,
    /// Affix in hyphen notation
    pub affix: String,
    /// Input part of speech
    pub from_pos: PartOfSpeech,
    /// Output part of speech
    pub to_pos: PartOfSpeech,
    /// Meaning contributed by the rule
    #[serde(default)]
    pub gloss: String,
}

/// A conditioned alternant of an affix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternation {
    /// Stable identifier
    pub id: String,
    /// Alternant affix form in hyphen notation
    pub affix: String,
    /// Conditioning environment, free text
    #[serde(default)]
    pub environment: String,
}

/// Morphological system of a language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Morphology {
    /// Typological label, e.g. `agglutinative`
    #[serde(default)]
    pub typology: Option<String>,
    /// Declared grammatical categories
    #[serde(default)]
    pub categories: Vec<GrammaticalCategory>,
    /// Inflectional paradigms
    #[serde(default)]
    pub paradigms: Vec<Paradigm>,
    /// Derivational rules
    #[serde(default)]
    pub derivations: Vec<DerivationalRule>,
    /// Affix alternations
    #[serde(default)]
    pub alternations: Vec<Alternation>,
}

impl Morphology {
    /// Find a declared category by name
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&GrammaticalCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Find a paradigm by id
    #[must_use]
    pub fn paradigm(&self, id: &str) -> Option<&Paradigm> {
        self.paradigms.iter().find(|p| p.id == id)
    }

    /// First paradigm declared for a part of speech
    #[must_use]
    pub fn paradigm_for(&self, pos: PartOfSpeech) -> Option<&Paradigm> {
        self.paradigms.iter().find(|p| p.pos == pos)
    }

    /// Find a derivational rule by id
    #[must_use]
    pub fn derivation(&self, id: &str) -> Option<&DerivationalRule> {
        self.derivations.iter().find(|d| d.id == id)
    }

    /// Every affix string declared anywhere in the morphology, tagged with
    /// the id of the paradigm, derivation, or alternation that owns it.
    pub fn affixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.paradigms
            .iter()
            .flat_map(|p| p.cells.iter().map(move |c| (p.id.as_str(), c.affix.as_str())))
            .chain(self.derivations.iter().map(|d| (d.id.as_str(), d.affix.as_str())))
            .chain(self.alternations.iter().map(|a| (a.id.as_str(), a.affix.as_str())))
    }
}

/// How an affix attaches to a stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffixKind {
    /// `ka-`
    Prefix,
    /// `-ta`, or a bare form with no hyphens
    Suffix,
    /// `-a-`
    Infix,
    /// Empty string or `∅`
    Zero,
}

/// An affix split into its attachment kind and phonological material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affix {
    /// Attachment kind
    pub kind: AffixKind,
    /// Material with hyphens removed
    pub form: String,
}

impl Affix {
    /// Parse hyphen notation
    #[must_use]
    pub fn parse(notation: &str) -> Self {
        let trimmed = notation.trim();
        if trimmed.is_empty() || trimmed == "∅" || trimmed == "-" || trimmed == "--" {
            return Self {
                kind: AffixKind::Zero,
                form: String::new(),
            };
        }
        let leading = trimmed.starts_with('-');
        let trailing = trimmed.ends_with('-');
        let form = trimmed.trim_matches('-').to_string();
        let kind = match (leading, trailing) {
            (true, true) => AffixKind::Infix,
            (false, true) => AffixKind::Prefix,
            _ => AffixKind::Suffix,
        };
        Self { kind, form }
    }

    /// Attach to a cleaned stem. Infixes need syllable structure to place
    /// and return `None`.
    #[must_use]
    pub fn attach(&self, stem: &str) -> Option<String> {
        match self.kind {
            AffixKind::Prefix => Some(format!("{}{}", self.form, stem)),
            AffixKind::Suffix => Some(format!("{}{}", stem, self.form)),
            AffixKind::Zero => Some(stem.to_string()),
            AffixKind::Infix => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affix_parse() {
        assert_eq!(Affix::parse("ka-").kind, AffixKind::Prefix);
        assert_eq!(Affix::parse("-ta").kind, AffixKind::Suffix);
        assert_eq!(Affix::parse("-a-").kind, AffixKind::Infix);
        assert_eq!(Affix::parse("∅").kind, AffixKind::Zero);
        assert_eq!(Affix::parse("").kind, AffixKind::Zero);
        assert_eq!(Affix::parse("mi").kind, AffixKind::Suffix);
        assert_eq!(Affix::parse("-ta").form, "ta");
    }

    #[test]
    fn test_affix_attach() {
        assert_eq!(Affix::parse("ka-").attach("pat").as_deref(), Some("kapat"));
        assert_eq!(Affix::parse("-ta").attach("pat").as_deref(), Some("patta"));
        assert_eq!(Affix::parse("").attach("pat").as_deref(), Some("pat"));
        assert_eq!(Affix::parse("-a-").attach("pat"), None);
    }

    #[test]
    fn test_affixes_iter() {
        let morphology = Morphology {
            paradigms: vec![Paradigm {
                id: "noun".into(),
                name: String::new(),
                pos: PartOfSpeech::Noun,
                categories: vec!["number".into()],
                cells: vec![ParadigmCell {
                    features: IndexMap::new(),
                    affix: "-ri".into(),
                }],
            }],
            derivations: vec![DerivationalRule {
                id: "agent".into(),
                name: String::new(),
                affix: "-ek".into(),
                from_pos: PartOfSpeech::Verb,
                to_pos: PartOfSpeech::Noun,
                gloss: String::new(),
            }],
            ..Morphology::default()
        };
        let all: Vec<_> = morphology.affixes().collect();
        assert_eq!(all, vec![("noun", "-ri"), ("agent", "-ek")]);
        assert!(morphology.paradigm_for(PartOfSpeech::Noun).is_some());
        assert!(morphology.derivation("agent").is_some());
    }
}
