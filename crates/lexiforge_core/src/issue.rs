//! Validation issues and results.
//!
//! Issues are immutable once produced. A [`ValidationResult`] is the union
//! of every issue from one validation run, and `valid` is derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks acceptance
    Error,
    /// Informational
    Warning,
}

/// Module an issue is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueModule {
    /// Inventory and phonotactics
    Phonology,
    /// Affixes and inflection
    Morphology,
    /// Phrase structure and word order
    Syntax,
    /// Lexicon integrity
    Lexicon,
    /// References between modules
    CrossModule,
    /// Orthography
    WritingSystem,
}

impl IssueModule {
    /// Kebab-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Phonology => "phonology",
            Self::Morphology => "morphology",
            Self::Syntax => "syntax",
            Self::Lexicon => "lexicon",
            Self::CrossModule => "cross-module",
            Self::WritingSystem => "writing-system",
        }
    }
}

impl fmt::Display for IssueModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding of the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Stable rule code, e.g. `phon.template-mismatch`
    pub rule_id: String,
    /// Severity
    pub severity: Severity,
    /// Attributed module
    pub module: IssueModule,
    /// Human-readable message
    pub message: String,
    /// Id of the offending entity, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_ref: Option<String>,
}

impl ValidationIssue {
    /// Create an error
    #[must_use]
    pub fn error(rule_id: &str, module: IssueModule, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity: Severity::Error,
            module,
            message: message.into(),
            entity_ref: None,
        }
    }

    /// Create a warning
    #[must_use]
    pub fn warning(rule_id: &str, module: IssueModule, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule_id, module, message)
        }
    }

    /// Attach the offending entity id
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity_ref = Some(entity.into());
        self
    }

    /// Check if this issue blocks acceptance
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Line shown to the model on the next attempt: `[module ruleId] message`
    #[must_use]
    pub fn feedback_line(&self) -> String {
        format!("[{} {}] {}", self.module, self.rule_id, self.message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.feedback_line())?;
        if let Some(entity) = &self.entity_ref {
            write!(f, " ({})", entity)?;
        }
        Ok(())
    }
}

/// Result of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff there are no errors
    pub valid: bool,
    /// All issues, in pass order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Build a result from issues, deriving `valid`
    #[must_use]
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues.iter().any(ValidationIssue::is_error);
        Self { valid, issues }
    }

    /// A result with no issues
    #[must_use]
    pub fn ok() -> Self {
        Self::from_issues(Vec::new())
    }

    /// Errors only
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    /// Warnings only
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    /// Number of errors
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Issues attributed to one module
    pub fn for_module(&self, module: IssueModule) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.module == module)
    }

    /// Feedback lines for every error, in order
    #[must_use]
    pub fn feedback(&self) -> Vec<String> {
        self.errors().map(ValidationIssue::feedback_line).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} error(s), {} warning(s)",
            if self.valid { "VALID" } else { "INVALID" },
            self.error_count(),
            self.issues.len() - self.error_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_line_format() {
        let issue = ValidationIssue::error(
            "phon.empty-consonants",
            IssueModule::Phonology,
            "consonant inventory is empty",
        );
        assert_eq!(
            issue.feedback_line(),
            "[phonology phon.empty-consonants] consonant inventory is empty"
        );
    }

    #[test]
    fn test_valid_iff_no_errors() {
        let warn = ValidationIssue::warning("x", IssueModule::Lexicon, "w");
        let err = ValidationIssue::error("y", IssueModule::Syntax, "e");

        assert!(ValidationResult::from_issues(vec![warn.clone()]).valid);
        let result = ValidationResult::from_issues(vec![warn, err]);
        assert!(!result.valid);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.feedback(), vec!["[syntax y] e".to_string()]);
        assert_eq!(result.summary(), "INVALID: 1 error(s), 1 warning(s)");
    }

    #[test]
    fn test_issue_serde() {
        let issue = ValidationIssue::warning("o", IssueModule::CrossModule, "m").with_entity("w1");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["module"], "cross-module");
        assert_eq!(json["ruleId"], "o");
        assert_eq!(json["entityRef"], "w1");
        assert_eq!(json["severity"], "warning");
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::error("r", IssueModule::WritingSystem, "gap").with_entity("ŋ");
        assert_eq!(issue.to_string(), "error: [writing-system r] gap (ŋ)");
    }
}
