//! Onset-maximizing syllabification.

use crate::tokenizer::Token;
use lexiforge_core::SegmentClass;
use serde::{Deserialize, Serialize};

/// A syllable split into onset, nucleus, and coda.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllable {
    /// Consonants before the nucleus
    pub onset: Vec<String>,
    /// Vowel(s); empty only for a vowel-less word
    pub nucleus: Vec<String>,
    /// Consonants after the nucleus
    pub coda: Vec<String>,
    /// Tone marks attached to this syllable
    pub tones: Vec<String>,
}

impl Syllable {
    /// C/V skeleton, e.g. `CVC`. Tones are not part of the skeleton.
    #[must_use]
    pub fn skeleton(&self) -> String {
        let mut s = String::with_capacity(self.onset.len() + self.nucleus.len() + self.coda.len());
        s.extend(self.onset.iter().map(|_| 'C'));
        s.extend(self.nucleus.iter().map(|_| 'V'));
        s.extend(self.coda.iter().map(|_| 'C'));
        s
    }

    /// Check if a nucleus has been assigned
    #[must_use]
    pub fn has_nucleus(&self) -> bool {
        !self.nucleus.is_empty()
    }

    /// Segmental text of the syllable, tones last
    #[must_use]
    pub fn text(&self) -> String {
        self.onset
            .iter()
            .chain(&self.nucleus)
            .chain(&self.coda)
            .chain(&self.tones)
            .map(String::as_str)
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.onset.is_empty() && self.nucleus.is_empty() && self.coda.is_empty() && self.tones.is_empty()
    }
}

/// Split tokens into syllables.
///
/// Consonants before a syllable's nucleus form its onset. Once a nucleus is
/// open, a consonant goes to the coda unless the next segmental token is a
/// vowel, in which case it opens the next syllable. A vowel arriving after
/// the nucleus also opens a new syllable. Tones attach to whatever syllable
/// is open. Deterministic and total: every token ends up in exactly one
/// syllable.
#[must_use]
pub fn syllabify(tokens: &[Token]) -> Vec<Syllable> {
    let mut syllables = Vec::new();
    let mut current = Syllable::default();

    for (i, token) in tokens.iter().enumerate() {
        match token.class {
            SegmentClass::Vowel => {
                if current.has_nucleus() {
                    syllables.push(std::mem::take(&mut current));
                }
                current.nucleus.push(token.symbol.clone());
            }
            SegmentClass::Consonant => {
                if !current.has_nucleus() {
                    current.onset.push(token.symbol.clone());
                } else if next_segment_is_vowel(&tokens[i + 1..]) {
                    syllables.push(std::mem::take(&mut current));
                    current.onset.push(token.symbol.clone());
                } else {
                    current.coda.push(token.symbol.clone());
                }
            }
            SegmentClass::Tone => current.tones.push(token.symbol.clone()),
        }
    }

    if !current.is_empty() {
        syllables.push(current);
    }
    syllables
}

fn next_segment_is_vowel(rest: &[Token]) -> bool {
    rest.iter()
        .find(|t| t.class != SegmentClass::Tone)
        .is_some_and(|t| t.class == SegmentClass::Vowel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use lexiforge_core::PhonemeInventory;
    use proptest::prelude::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(
            &PhonemeInventory::new(["p", "t", "k", "s", "m", "n", "l", "r"], ["a", "i", "u"])
                .with_tones(["˥"]),
        )
    }

    fn split(form: &str) -> Vec<String> {
        syllabify(&tokenizer().tokenize(form).unwrap())
            .iter()
            .map(Syllable::text)
            .collect()
    }

    fn skeletons(form: &str) -> Vec<String> {
        syllabify(&tokenizer().tokenize(form).unwrap())
            .iter()
            .map(Syllable::skeleton)
            .collect()
    }

    #[test]
    fn test_open_syllables() {
        assert_eq!(split("pata"), vec!["pa", "ta"]);
        assert_eq!(skeletons("pata"), vec!["CV", "CV"]);
    }

    #[test]
    fn test_medial_cluster_splits() {
        assert_eq!(split("pasta"), vec!["pas", "ta"]);
        assert_eq!(skeletons("pansta"), vec!["CVCC", "CV"]);
    }

    #[test]
    fn test_vowel_hiatus() {
        assert_eq!(split("aia"), vec!["a", "i", "a"]);
        assert_eq!(skeletons("aia"), vec!["V", "V", "V"]);
    }

    #[test]
    fn test_initial_cluster_and_final_coda() {
        assert_eq!(skeletons("trak"), vec!["CCVC"]);
    }

    #[test]
    fn test_vowelless_word_is_one_syllable() {
        let syllables = syllabify(&tokenizer().tokenize("ptk").unwrap());
        assert_eq!(syllables.len(), 1);
        assert!(!syllables[0].has_nucleus());
        assert_eq!(syllables[0].skeleton(), "CCC");
    }

    #[test]
    fn test_tone_attaches_to_open_syllable() {
        let syllables = syllabify(&tokenizer().tokenize("ma˥ta").unwrap());
        assert_eq!(syllables.len(), 2);
        assert_eq!(syllables[0].tones, vec!["˥"]);
        assert_eq!(syllables[0].skeleton(), "CV");
    }

    #[test]
    fn test_consonant_before_tone_then_vowel_is_onset() {
        assert_eq!(skeletons("pat˥a"), vec!["CV", "CV"]);
    }

    proptest! {
        #[test]
        fn prop_syllabify_deterministic_and_lossless(
            picks in proptest::collection::vec(0usize..12, 0..16),
        ) {
            let all = ["p", "t", "k", "s", "m", "n", "l", "r", "a", "i", "u", "˥"];
            let form: String = picks.iter().map(|i| all[*i]).collect();
            let tokens = tokenizer().tokenize(&form).unwrap_or_default();

            let first = syllabify(&tokens);
            let second = syllabify(&tokens);
            prop_assert_eq!(&first, &second);

            let segment_count: usize = first
                .iter()
                .map(|s| s.onset.len() + s.nucleus.len() + s.coda.len() + s.tones.len())
                .sum();
            prop_assert_eq!(segment_count, tokens.len());
            prop_assert!(first.iter().all(|s| s.nucleus.len() <= 1));
        }
    }
}
