//! Lexical entries.

use serde::{Deserialize, Serialize};

/// Part of speech for a lexical entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    /// noun
    Noun,
    /// verb
    Verb,
    /// adjective
    Adjective,
    /// adverb
    Adverb,
    /// pronoun
    Pronoun,
    /// numeral
    Numeral,
    /// particle
    Particle,
    /// adposition
    Adposition,
    /// conjunction
    Conjunction,
    /// determiner
    Determiner,
    /// interjection
    Interjection,
    /// Anything the closed set does not name
    #[serde(other)]
    Other,
}

impl PartOfSpeech {
    /// Lowercase name as it appears in JSON
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Pronoun => "pronoun",
            Self::Numeral => "numeral",
            Self::Particle => "particle",
            Self::Adposition => "adposition",
            Self::Conjunction => "conjunction",
            Self::Determiner => "determiner",
            Self::Interjection => "interjection",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numbered sense of a polysemous entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sense {
    /// 1-based sense number
    pub index: u32,
    /// Gloss for this sense
    pub gloss: String,
}

/// A form derived from an entry by a derivational rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedForm {
    /// Id of the derivational rule applied
    pub rule_id: String,
    /// Orthographic form
    #[serde(default)]
    pub lemma: String,
    /// Phonological form
    pub ipa: String,
    /// Meaning
    #[serde(default)]
    pub gloss: String,
}

/// A lexical entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexEntry {
    /// Stable identifier, unique within the lexicon
    pub id: String,
    /// Orthographic form
    pub lemma: String,
    /// Phonological form, optionally `/slash-delimited/`
    pub ipa: String,
    /// Part of speech
    pub pos: PartOfSpeech,
    /// Primary English gloss
    pub gloss: String,
    /// Additional senses; empty for monosemous entries
    #[serde(default)]
    pub senses: Vec<Sense>,
    /// Required-slot id this entry fills, if any
    #[serde(default)]
    pub slot: Option<String>,
    /// Paradigm used to inflect this entry; defaults to the first paradigm
    /// declared for its part of speech
    #[serde(default)]
    pub paradigm_id: Option<String>,
    /// Derived forms
    #[serde(default)]
    pub derived_forms: Vec<DerivedForm>,
}

impl LexEntry {
    /// Create a monosemous entry
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        lemma: impl Into<String>,
        ipa: impl Into<String>,
        pos: PartOfSpeech,
        gloss: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lemma: lemma.into(),
            ipa: ipa.into(),
            pos,
            gloss: gloss.into(),
            senses: Vec::new(),
            slot: None,
            paradigm_id: None,
            derived_forms: Vec::new(),
        }
    }

    /// Mark the required slot this entry fills
    #[must_use]
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Add a derived form
    #[must_use]
    pub fn with_derived(mut self, form: DerivedForm) -> Self {
        self.derived_forms.push(form);
        self
    }

    /// Glosses of all senses, primary gloss first
    pub fn glosses(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.gloss.as_str()).chain(self.senses.iter().map(|s| s.gloss.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_serde() {
        let json = serde_json::to_string(&PartOfSpeech::Numeral).unwrap();
        assert_eq!(json, "\"numeral\"");
        let parsed: PartOfSpeech = serde_json::from_str("\"classifier\"").unwrap();
        assert_eq!(parsed, PartOfSpeech::Other);
    }

    #[test]
    fn test_lex_entry_defaults() {
        let json = r#"{"id":"w1","lemma":"pata","ipa":"/pata/","pos":"noun","gloss":"stone"}"#;
        let entry: LexEntry = serde_json::from_str(json).unwrap();
        assert!(entry.senses.is_empty());
        assert!(entry.derived_forms.is_empty());
        assert_eq!(entry.slot, None);
    }

    #[test]
    fn test_lex_entry_missing_required_field() {
        let json = r#"{"id":"w1","lemma":"pata","pos":"noun","gloss":"stone"}"#;
        assert!(serde_json::from_str::<LexEntry>(json).is_err());
    }

    #[test]
    fn test_glosses() {
        let mut entry = LexEntry::new("w1", "sel", "sel", PartOfSpeech::Noun, "sun");
        entry.senses.push(Sense {
            index: 1,
            gloss: "day".into(),
        });
        let all: Vec<_> = entry.glosses().collect();
        assert_eq!(all, vec!["sun", "day"]);
    }
}
