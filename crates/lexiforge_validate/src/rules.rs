//! Stable rule identifiers.
//!
//! These strings are part of the feedback shown to the model and of the
//! JSON returned to callers. Renaming one is a breaking change.

#![allow(missing_docs)]

// Phonological pass
pub const PHON_EMPTY_CONSONANTS: &str = "phon.empty-consonants";
pub const PHON_EMPTY_VOWELS: &str = "phon.empty-vowels";
pub const PHON_DUPLICATE_PHONEME: &str = "phon.duplicate-phoneme";
pub const PHON_NO_TEMPLATES: &str = "phon.no-templates";
pub const PHON_TEMPLATE_MALFORMED: &str = "phon.template-malformed";
pub const PHON_ALLOPHONY_UNKNOWN: &str = "phon.allophony-unknown-phoneme";
pub const PHON_CLUSTER_UNKNOWN: &str = "phon.cluster-unknown-phoneme";
pub const PHON_CLUSTER_UNDECLARED: &str = "phon.cluster-undeclared";
pub const PHON_UNKNOWN_SYMBOL: &str = "phon.unknown-symbol";
pub const PHON_EMPTY_FORM: &str = "phon.empty-form";
pub const PHON_TEMPLATE_MISMATCH: &str = "phon.template-mismatch";
pub const ORTH_MISSING_GRAPHEME: &str = "orth.missing-grapheme";
pub const ORTH_UNKNOWN_PHONEME: &str = "orth.unknown-phoneme";
pub const ORTH_EMPTY_GRAPHEME: &str = "orth.empty-grapheme";
pub const ORTH_COLLISION: &str = "orth.grapheme-collision";

// Morphological pass
pub const MORPH_AFFIX_SYMBOL: &str = "morph.affix-unknown-symbol";
pub const MORPH_INFLECTED_FORM: &str = "morph.inflected-phonotactics";
pub const MORPH_EMPTY_PARADIGM: &str = "morph.empty-paradigm";
pub const MORPH_DUPLICATE_ID: &str = "morph.duplicate-id";

// Syntactic pass
pub const SYN_MALFORMED_RULE: &str = "syn.malformed-rule";
pub const SYN_UNDECLARED_CONSTITUENT: &str = "syn.undeclared-constituent";
pub const SYN_NO_CLAUSE_TYPES: &str = "syn.no-clause-types";
pub const SYN_WORD_ORDER: &str = "syn.word-order-mismatch";

// Cross-module pass
pub const XMOD_AFFIX_INVENTORY: &str = "xmod.affix-inventory";
pub const XMOD_ORTHOGRAPHY_INCOMPLETE: &str = "xmod.orthography-incomplete";
pub const XMOD_UNDECLARED_CATEGORY: &str = "xmod.undeclared-category";
pub const XMOD_UNDECLARED_VALUE: &str = "xmod.undeclared-category-value";
pub const XMOD_UNKNOWN_PARADIGM: &str = "xmod.unknown-paradigm";
pub const XMOD_MIN_VOCABULARY: &str = "xmod.min-vocabulary";
pub const XMOD_MISSING_CORE_POS: &str = "xmod.missing-core-pos";
pub const LEX_DUPLICATE_ID: &str = "lex.duplicate-id";
pub const LEX_DUPLICATE_FORM: &str = "lex.duplicate-form";
pub const LEX_MISSING_FIELD: &str = "lex.missing-field";
pub const LEX_MALFORMED_SENSES: &str = "lex.malformed-senses";
pub const LEX_UNKNOWN_DERIVATION: &str = "lex.unknown-derivation";
