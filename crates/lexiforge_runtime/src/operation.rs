//! Gated operations.
//!
//! A [`GatedOperation`] adapts one kind of model call to the executor: it
//! turns a typed request into a prompt, decodes raw text into a typed
//! output, says which validation passes gate that output, and knows how
//! to fold an accepted output into the accumulated language.

use lexiforge_core::{LanguageDefinition, ValidationResult};
use lexiforge_validate::ValidationPass;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Failure to decode a model response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No JSON object or array anywhere in the text
    #[error("no JSON document found in the response")]
    NoJson,
    /// JSON present but not matching the expected schema
    #[error("response JSON does not match the expected shape: {0}")]
    Schema(String),
    /// Well-formed but semantically unusable
    #[error("{0}")]
    Invalid(String),
}

/// Slice out the JSON document of a model response.
///
/// Code fences and surrounding prose are ignored: the document runs from
/// the first `{` or `[` to the last matching closer.
///
/// # Errors
///
/// Returns [`ParseError::NoJson`] if there is no candidate document
pub fn extract_json(raw: &str) -> Result<&str, ParseError> {
    let start = raw.find(['{', '[']).ok_or(ParseError::NoJson)?;
    let close = if raw[start..].starts_with('{') { '}' } else { ']' };
    let end = raw.rfind(close).ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }
    Ok(&raw[start..=end])
}

/// Decode the JSON document inside a model response
///
/// # Errors
///
/// Returns [`ParseError`] if no document is found or it does not decode as `T`
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let json = extract_json(raw)?;
    serde_json::from_str(json).map_err(|e| ParseError::Schema(e.to_string()))
}

/// Outcome of one semantic attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    /// Parsed and passed its validation slice
    Success {
        /// Decoded output
        data: T,
        /// Result of the slice (warnings only)
        validation: ValidationResult,
    },
    /// Response could not be decoded
    ParseFailure(ParseError),
    /// Decoded but rejected by the validator
    ValidationFailure(ValidationResult),
}

/// One kind of validation-gated model call.
pub trait GatedOperation: Send + Sync {
    /// Typed request; its canonical JSON is the cache key
    type Request: Serialize + Send + Sync;
    /// Typed output, cached as JSON
    type Output: Serialize + DeserializeOwned + Clone + Send + Sync;

    /// Operation name, used in prompts, cache keys and logs
    fn name(&self) -> &'static str;

    /// Validation passes that gate the output
    fn passes(&self) -> &'static [ValidationPass];

    /// System instructions
    fn system(&self) -> &'static str {
        "You design constructed languages. Answer with a single JSON document and nothing else."
    }

    /// Prompt for `request`, given the current language
    fn prompt(&self, request: &Self::Request, base: &LanguageDefinition) -> String;

    /// Decode raw model text
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the text is not a usable output
    fn parse(&self, raw: &str) -> Result<Self::Output, ParseError> {
        parse_json(raw)
    }

    /// The definition the validator sees for `output`
    fn candidate(&self, base: &LanguageDefinition, output: &Self::Output) -> LanguageDefinition;

    /// Fold an accepted output into the accumulated language
    fn merge(&self, state: &mut LanguageDefinition, output: Self::Output);

    /// Short human description of an output, for progress events
    fn describe(&self, output: &Self::Output) -> String;
}
