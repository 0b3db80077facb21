//! Required vocabulary slots and lexicon coverage.
//!
//! The required-slot list is the core vocabulary every generated lexicon is
//! steered toward first. Pronouns and numerals in it double as the
//! core-part-of-speech presence check.

use crate::lexicon::{LexEntry, PartOfSpeech};
use serde::Serialize;

/// A concept the lexicon must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSlot {
    /// Slot id, recorded on entries that fill it
    pub id: &'static str,
    /// English gloss
    pub gloss: &'static str,
    /// Expected part of speech
    pub pos: PartOfSpeech,
}

const fn slot(id: &'static str, gloss: &'static str, pos: PartOfSpeech) -> RequiredSlot {
    RequiredSlot { id, gloss, pos }
}

/// Core vocabulary, in request order.
pub const REQUIRED_SLOTS: &[RequiredSlot] = &[
    slot("pron.1sg", "I", PartOfSpeech::Pronoun),
    slot("pron.2sg", "you", PartOfSpeech::Pronoun),
    slot("pron.3sg", "he/she", PartOfSpeech::Pronoun),
    slot("pron.1pl", "we", PartOfSpeech::Pronoun),
    slot("pron.3pl", "they", PartOfSpeech::Pronoun),
    slot("num.1", "one", PartOfSpeech::Numeral),
    slot("num.2", "two", PartOfSpeech::Numeral),
    slot("num.3", "three", PartOfSpeech::Numeral),
    slot("num.5", "five", PartOfSpeech::Numeral),
    slot("num.10", "ten", PartOfSpeech::Numeral),
    slot("body.head", "head", PartOfSpeech::Noun),
    slot("body.eye", "eye", PartOfSpeech::Noun),
    slot("body.hand", "hand", PartOfSpeech::Noun),
    slot("body.foot", "foot", PartOfSpeech::Noun),
    slot("body.heart", "heart", PartOfSpeech::Noun),
    slot("kin.mother", "mother", PartOfSpeech::Noun),
    slot("kin.father", "father", PartOfSpeech::Noun),
    slot("kin.child", "child", PartOfSpeech::Noun),
    slot("nat.water", "water", PartOfSpeech::Noun),
    slot("nat.fire", "fire", PartOfSpeech::Noun),
    slot("nat.sun", "sun", PartOfSpeech::Noun),
    slot("nat.moon", "moon", PartOfSpeech::Noun),
    slot("nat.stone", "stone", PartOfSpeech::Noun),
    slot("nat.tree", "tree", PartOfSpeech::Noun),
    slot("nat.earth", "earth", PartOfSpeech::Noun),
    slot("nat.sky", "sky", PartOfSpeech::Noun),
    slot("ani.dog", "dog", PartOfSpeech::Noun),
    slot("ani.bird", "bird", PartOfSpeech::Noun),
    slot("ani.fish", "fish", PartOfSpeech::Noun),
    slot("verb.eat", "eat", PartOfSpeech::Verb),
    slot("verb.drink", "drink", PartOfSpeech::Verb),
    slot("verb.see", "see", PartOfSpeech::Verb),
    slot("verb.hear", "hear", PartOfSpeech::Verb),
    slot("verb.go", "go", PartOfSpeech::Verb),
    slot("verb.come", "come", PartOfSpeech::Verb),
    slot("verb.give", "give", PartOfSpeech::Verb),
    slot("verb.say", "say", PartOfSpeech::Verb),
    slot("verb.know", "know", PartOfSpeech::Verb),
    slot("verb.sleep", "sleep", PartOfSpeech::Verb),
    slot("verb.die", "die", PartOfSpeech::Verb),
    slot("adj.big", "big", PartOfSpeech::Adjective),
    slot("adj.small", "small", PartOfSpeech::Adjective),
    slot("adj.good", "good", PartOfSpeech::Adjective),
    slot("adj.new", "new", PartOfSpeech::Adjective),
    slot("adj.cold", "cold", PartOfSpeech::Adjective),
    slot("part.not", "not", PartOfSpeech::Particle),
    slot("conj.and", "and", PartOfSpeech::Conjunction),
];

/// Semantic fields requested once every required slot is filled.
pub const DEFAULT_FIELDS: &[&str] = &[
    "animals",
    "plants",
    "weather",
    "household objects",
    "tools and crafts",
    "food and cooking",
    "emotions",
    "motion verbs",
    "colors",
    "social roles",
    "landscape",
    "time and seasons",
];

/// Normalize a gloss for slot matching: lowercase, no leading `to `.
fn normalize(gloss: &str) -> String {
    let lower = gloss.trim().to_lowercase();
    lower.strip_prefix("to ").map_or(lower.clone(), str::to_string)
}

impl RequiredSlot {
    /// Check whether an entry fills this slot, either by an explicit slot id
    /// or by any of its glosses.
    #[must_use]
    pub fn is_filled_by(&self, entry: &LexEntry) -> bool {
        if entry.slot.as_deref() == Some(self.id) {
            return true;
        }
        let wanted = normalize(self.gloss);
        entry.glosses().any(|g| normalize(g) == wanted)
    }
}

/// Which required slots a lexicon covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// Filled slot ids
    pub filled: Vec<&'static str>,
    /// Unfilled slots, in request order
    pub missing: Vec<RequiredSlot>,
}

impl CoverageReport {
    /// Compute coverage of `REQUIRED_SLOTS` by a lexicon
    #[must_use]
    pub fn compute(lexicon: &[LexEntry]) -> Self {
        let (filled, missing): (Vec<&RequiredSlot>, Vec<&RequiredSlot>) = REQUIRED_SLOTS
            .iter()
            .partition(|slot| lexicon.iter().any(|e| slot.is_filled_by(e)));
        Self {
            filled: filled.into_iter().map(|s| s.id).collect(),
            missing: missing.into_iter().copied().collect(),
        }
    }

    /// Fraction of required slots filled, in `0.0..=1.0`
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.filled.len() as f64 / REQUIRED_SLOTS.len() as f64
    }

    /// Check whether every required slot is filled
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}
