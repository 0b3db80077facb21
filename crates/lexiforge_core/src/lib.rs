//! LEXIFORGE Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! A [`LanguageDefinition`] is the single value that every other crate
//! reads, validates, or grows. All types serialize with camelCase keys so
//! they can be forwarded to and from the HTTP layer unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod corpus;
pub mod coverage;
pub mod error;
pub mod hash;
pub mod id;
pub mod issue;
pub mod language;
pub mod lexicon;
pub mod morphology;
pub mod phonology;
pub mod syntax;

// Re-exports
pub use corpus::CorpusSentence;
pub use coverage::{CoverageReport, DEFAULT_FIELDS, REQUIRED_SLOTS, RequiredSlot};
pub use error::{CoreError, CoreResult};
pub use hash::{Hash, HashError};
pub use id::RunId;
pub use issue::{IssueModule, Severity, ValidationIssue, ValidationResult};
pub use language::LanguageDefinition;
pub use lexicon::{DerivedForm, LexEntry, PartOfSpeech, Sense};
pub use morphology::{
    Affix, AffixKind, Alternation, DerivationalRule, GrammaticalCategory, Morphology, Paradigm,
    ParadigmCell,
};
pub use phonology::{
    AllophonyRule, PhonemeInventory, Phonology, Phonotactics, SegmentClass, SyllablePosition,
};
pub use syntax::{ClauseType, PhraseRule, RuleSymbol, Syntax, WordOrder};
