//! Phoneme inventory, phonotactics, and orthography.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which of the three inventory sets a symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentClass {
    /// Consonant
    Consonant,
    /// Vowel (syllable nucleus)
    Vowel,
    /// Tone mark, attaches to the open syllable
    Tone,
}

impl SegmentClass {
    /// Letter used for this class in a C/V skeleton, if any.
    #[must_use]
    pub const fn skeleton_char(&self) -> Option<char> {
        match self {
            Self::Consonant => Some('C'),
            Self::Vowel => Some('V'),
            Self::Tone => None,
        }
    }
}

/// Consonant, vowel, and tone symbols of a language.
///
/// The three sets are expected to be disjoint; overlap is reported by the
/// validator rather than rejected at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeInventory {
    /// Consonant symbols (IPA)
    #[serde(default)]
    pub consonants: Vec<String>,
    /// Vowel symbols (IPA)
    #[serde(default)]
    pub vowels: Vec<String>,
    /// Tone symbols, empty for non-tonal languages
    #[serde(default)]
    pub tones: Vec<String>,
}

impl PhonemeInventory {
    /// Create an inventory without tones
    #[must_use]
    pub fn new<C, V>(consonants: C, vowels: V) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            consonants: consonants.into_iter().map(Into::into).collect(),
            vowels: vowels.into_iter().map(Into::into).collect(),
            tones: Vec::new(),
        }
    }

    /// Set tone symbols
    #[must_use]
    pub fn with_tones<T>(mut self, tones: T) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        self.tones = tones.into_iter().map(Into::into).collect();
        self
    }

    /// All symbols tagged with their class, consonants first.
    pub fn segments(&self) -> impl Iterator<Item = (&str, SegmentClass)> {
        self.consonants
            .iter()
            .map(|s| (s.as_str(), SegmentClass::Consonant))
            .chain(self.vowels.iter().map(|s| (s.as_str(), SegmentClass::Vowel)))
            .chain(self.tones.iter().map(|s| (s.as_str(), SegmentClass::Tone)))
    }

    /// Class of a symbol, if it is in the inventory
    #[must_use]
    pub fn class_of(&self, symbol: &str) -> Option<SegmentClass> {
        self.segments()
            .find(|(s, _)| *s == symbol)
            .map(|(_, class)| class)
    }

    /// Check whether a symbol is in any of the three sets
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.class_of(symbol).is_some()
    }

    /// Total number of symbols across all sets
    #[must_use]
    pub fn len(&self) -> usize {
        self.consonants.len() + self.vowels.len() + self.tones.len()
    }

    /// Check if every set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Syllable position an allophony rule is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyllablePosition {
    /// Syllable onset
    Onset,
    /// Syllable nucleus
    Nucleus,
    /// Syllable coda
    Coda,
}

/// A base phoneme surfacing as an allophone in some environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllophonyRule {
    /// Underlying phoneme
    pub phoneme: String,
    /// Surface realization
    pub allophone: String,
    /// Free-text environment, e.g. `_V` or `between vowels`
    #[serde(default)]
    pub environment: String,
    /// Optional positional restriction
    #[serde(default)]
    pub position: Option<SyllablePosition>,
}

/// Syllable structure constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phonotactics {
    /// Templates over `C`/`V` with at most one optional group, e.g. `CV(C)`.
    /// Declaration order is match priority.
    #[serde(default)]
    pub syllable_templates: Vec<String>,
    /// Permitted multi-consonant onsets
    #[serde(default)]
    pub onset_clusters: Vec<Vec<String>>,
    /// Permitted multi-consonant codas
    #[serde(default)]
    pub coda_clusters: Vec<Vec<String>>,
    /// Allophonic rules
    #[serde(default)]
    pub allophony: Vec<AllophonyRule>,
}

impl Phonotactics {
    /// Create phonotactics from template strings
    #[must_use]
    pub fn with_templates<T>(templates: T) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            syllable_templates: templates.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Sound system of a language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phonology {
    /// Phoneme inventory
    #[serde(default)]
    pub inventory: PhonemeInventory,
    /// Phonotactic constraints
    #[serde(default)]
    pub phonotactics: Phonotactics,
    /// Phoneme to grapheme mapping, in declaration order
    #[serde(default)]
    pub orthography: IndexMap<String, String>,
}

impl Phonology {
    /// Romanize a sequence of phoneme tokens. Phonemes without a grapheme
    /// are passed through unchanged.
    #[must_use]
    pub fn romanize<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        tokens
            .iter()
            .map(|t| {
                let t = t.as_ref();
                self.orthography.get(t).map_or(t, String::as_str)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_class_of() {
        let inv = PhonemeInventory::new(["p", "t", "tʃ"], ["a", "i"]).with_tones(["˥"]);
        assert_eq!(inv.class_of("tʃ"), Some(SegmentClass::Consonant));
        assert_eq!(inv.class_of("i"), Some(SegmentClass::Vowel));
        assert_eq!(inv.class_of("˥"), Some(SegmentClass::Tone));
        assert_eq!(inv.class_of("x"), None);
        assert_eq!(inv.len(), 6);
    }

    #[test]
    fn test_inventory_deserialize_defaults() {
        let inv: PhonemeInventory = serde_json::from_str(r#"{"consonants":["k"]}"#).unwrap();
        assert_eq!(inv.consonants, vec!["k"]);
        assert!(inv.vowels.is_empty());
        assert!(inv.tones.is_empty());
    }

    #[test]
    fn test_phonotactics_camel_case() {
        let json = r#"{"syllableTemplates":["CV(C)"],"onsetClusters":[["p","l"]]}"#;
        let p: Phonotactics = serde_json::from_str(json).unwrap();
        assert_eq!(p.syllable_templates, vec!["CV(C)"]);
        assert_eq!(p.onset_clusters, vec![vec!["p".to_string(), "l".to_string()]]);
    }

    #[test]
    fn test_romanize() {
        let mut phonology = Phonology::default();
        phonology.orthography.insert("tʃ".into(), "ch".into());
        phonology.orthography.insert("a".into(), "a".into());
        assert_eq!(phonology.romanize(&["tʃ", "a", "ŋ"]), "chaŋ");
    }
}
