//! LEXIFORGE Phonology
//!
//! Turns raw phonological strings into phoneme tokens, groups tokens into
//! syllables, and matches each syllable's C/V skeleton against declared
//! templates. Everything here is deterministic and total: any input yields
//! either a parse or a definite error, never a panic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod syllable;
pub mod template;
pub mod tokenizer;

pub use analyzer::{SyllableParse, WordAnalysis, WordAnalyzer};
pub use syllable::{Syllable, syllabify};
pub use template::{SyllableTemplate, TemplateError, TemplateSet};
pub use tokenizer::{Token, TokenizeError, Tokenizer, clean_form};
