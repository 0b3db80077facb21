//! Greedy longest-match tokenizer over a phoneme inventory.

use lexiforge_core::{PhonemeInventory, SegmentClass};
use serde::{Deserialize, Serialize};

/// Tokenization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// No inventory symbol matches at this position
    #[error("unknown symbol `{symbol}` at position {position} in `{form}`")]
    UnknownSymbol {
        /// Cleaned form being tokenized
        form: String,
        /// Character offset into the cleaned form
        position: usize,
        /// The unmatched character
        symbol: String,
    },
    /// Nothing left after cleaning
    #[error("empty phonological form")]
    Empty,
}

/// A phoneme token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Inventory symbol
    pub symbol: String,
    /// Symbol class
    pub class: SegmentClass,
}

/// Strip delimiters, separators, and stress marks from a phonological form.
///
/// `/ˈpa.ta/` becomes `pata`. Joining the tokens of a successful
/// tokenization always reproduces this cleaned string.
#[must_use]
pub fn clean_form(form: &str) -> String {
    form.chars()
        .filter(|c| !matches!(c, '/' | '[' | ']' | '.' | 'ˈ' | 'ˌ') && !c.is_whitespace())
        .collect()
}

/// Tokenizer for one inventory.
///
/// Symbols are tried longest-first, so `tʃ` wins over `t` when both exist.
/// There is no backtracking: the first position where no symbol matches is
/// reported as an unknown symbol.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    symbols: Vec<(String, SegmentClass)>,
}

impl Tokenizer {
    /// Build a tokenizer. A symbol listed in more than one set keeps its
    /// first class (consonant, then vowel, then tone).
    #[must_use]
    pub fn new(inventory: &PhonemeInventory) -> Self {
        let mut symbols: Vec<(String, SegmentClass)> = Vec::with_capacity(inventory.len());
        for (symbol, class) in inventory.segments() {
            let symbol = symbol.trim();
            if symbol.is_empty() || symbols.iter().any(|(s, _)| s == symbol) {
                continue;
            }
            symbols.push((symbol.to_string(), class));
        }
        // Stable sort keeps declaration order among equal lengths.
        symbols.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { symbols }
    }

    /// Symbols in match order
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.symbols.iter().map(|(s, _)| s.as_str()).collect()
    }

    /// Tokenize a raw form
    ///
    /// # Errors
    ///
    /// Returns [`TokenizeError::UnknownSymbol`] at the first unmatched
    /// position, or [`TokenizeError::Empty`] if the form cleans to nothing.
    pub fn tokenize(&self, form: &str) -> Result<Vec<Token>, TokenizeError> {
        let cleaned = clean_form(form);
        if cleaned.is_empty() {
            return Err(TokenizeError::Empty);
        }

        let mut tokens = Vec::new();
        let mut rest = cleaned.as_str();
        while !rest.is_empty() {
            let matched = self
                .symbols
                .iter()
                .find(|(symbol, _)| rest.starts_with(symbol.as_str()));
            let Some((symbol, class)) = matched else {
                let consumed = cleaned.len() - rest.len();
                return Err(TokenizeError::UnknownSymbol {
                    position: cleaned[..consumed].chars().count(),
                    symbol: rest.chars().next().map(String::from).unwrap_or_default(),
                    form: cleaned,
                });
            };
            tokens.push(Token {
                symbol: symbol.clone(),
                class: *class,
            });
            rest = &rest[symbol.len()..];
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inventory() -> PhonemeInventory {
        PhonemeInventory::new(["p", "t", "k", "tʃ", "s", "m", "n", "ŋ"], ["a", "i", "u", "aː"])
            .with_tones(["˥", "˩"])
    }

    fn symbols(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.symbol.as_str()).collect()
    }

    #[test]
    fn test_clean_form() {
        assert_eq!(clean_form("/ˈpa.ta/"), "pata");
        assert_eq!(clean_form("[tʃa ma]"), "tʃama");
    }

    #[test]
    fn test_longest_match_first() {
        let tokenizer = Tokenizer::new(&inventory());
        let tokens = tokenizer.tokenize("/tʃaːt/").unwrap();
        assert_eq!(symbols(&tokens), vec!["tʃ", "aː", "t"]);
        assert_eq!(tokens[1].class, SegmentClass::Vowel);
    }

    #[test]
    fn test_tone_tokens() {
        let tokenizer = Tokenizer::new(&inventory());
        let tokens = tokenizer.tokenize("ma˥").unwrap();
        assert_eq!(tokens[2].class, SegmentClass::Tone);
    }

    #[test]
    fn test_unknown_symbol() {
        let tokenizer = Tokenizer::new(&inventory());
        let err = tokenizer.tokenize("/paxa/").unwrap_err();
        assert_eq!(
            err,
            TokenizeError::UnknownSymbol {
                form: "paxa".into(),
                position: 2,
                symbol: "x".into(),
            }
        );
    }

    #[test]
    fn test_empty_form() {
        let tokenizer = Tokenizer::new(&inventory());
        assert_eq!(tokenizer.tokenize("//"), Err(TokenizeError::Empty));
    }

    #[test]
    fn test_duplicate_symbol_keeps_first_class() {
        let inv = PhonemeInventory::new(["a"], ["a"]);
        let tokenizer = Tokenizer::new(&inv);
        assert_eq!(tokenizer.symbols(), vec!["a"]);
        assert_eq!(
            tokenizer.tokenize("a").unwrap()[0].class,
            SegmentClass::Consonant
        );
    }

    proptest! {
        #[test]
        fn prop_tokenize_total_and_round_trips(form in "\\PC{0,16}") {
            let tokenizer = Tokenizer::new(&inventory());
            if let Ok(tokens) = tokenizer.tokenize(&form) {
                let joined: String = tokens.iter().map(|t| t.symbol.as_str()).collect();
                prop_assert_eq!(joined, clean_form(&form));
            }
        }

        #[test]
        fn prop_symbol_strings_always_tokenize(
            picks in proptest::collection::vec(0usize..14, 1..12),
            dotted in any::<bool>(),
        ) {
            let inv = inventory();
            let all: Vec<&str> = inv.segments().map(|(s, _)| s).collect();
            let parts: Vec<&str> = picks.iter().map(|i| all[*i]).collect();
            let sep = if dotted { "." } else { "" };
            let form = format!("/{}/", parts.join(sep));

            let tokens = Tokenizer::new(&inv).tokenize(&form).unwrap();
            prop_assert_eq!(symbols(&tokens), parts);
        }
    }
}
