//! Syllable templates over `C` and `V` with one optional group.

use serde::Serialize;

/// Template configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Blank template
    #[error("empty syllable template")]
    Empty,
    /// A symbol other than C, V, or parentheses
    #[error("invalid symbol `{symbol}` in template `{template}`")]
    InvalidSymbol {
        /// Template source
        template: String,
        /// Offending character
        symbol: char,
    },
    /// More than one optional group
    #[error("template `{template}` has more than one optional group")]
    MultipleGroups {
        /// Template source
        template: String,
    },
    /// A group inside a group
    #[error("template `{template}` nests optional groups")]
    NestedGroup {
        /// Template source
        template: String,
    },
    /// Mismatched parentheses
    #[error("template `{template}` has unbalanced parentheses")]
    Unbalanced {
        /// Template source
        template: String,
    },
    /// `()` with nothing inside
    #[error("template `{template}` has an empty optional group")]
    EmptyGroup {
        /// Template source
        template: String,
    },
}

/// A parsed template and the concrete skeletons it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyllableTemplate {
    source: String,
    variants: Vec<String>,
}

impl SyllableTemplate {
    /// Parse a template such as `CV`, `CV(C)`, or `(C)VC`. Lowercase `c`/`v`
    /// and whitespace are tolerated.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for anything other than a flat C/V
    /// string with at most one non-empty optional group.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let normalized: String = source
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if normalized.is_empty() {
            return Err(TemplateError::Empty);
        }
        let template = || source.trim().to_string();

        let mut before = String::new();
        let mut group = String::new();
        let mut after = String::new();
        let mut depth = 0u8;
        let mut groups = 0u8;

        for c in normalized.chars() {
            match c {
                '(' => {
                    if depth > 0 {
                        return Err(TemplateError::NestedGroup { template: template() });
                    }
                    if groups > 0 {
                        return Err(TemplateError::MultipleGroups { template: template() });
                    }
                    depth = 1;
                    groups = 1;
                }
                ')' => {
                    if depth == 0 {
                        return Err(TemplateError::Unbalanced { template: template() });
                    }
                    if group.is_empty() {
                        return Err(TemplateError::EmptyGroup { template: template() });
                    }
                    depth = 0;
                }
                'C' | 'V' => match (depth, groups) {
                    (1, _) => group.push(c),
                    (_, 0) => before.push(c),
                    _ => after.push(c),
                },
                other => {
                    return Err(TemplateError::InvalidSymbol {
                        template: template(),
                        symbol: other,
                    });
                }
            }
        }
        if depth != 0 {
            return Err(TemplateError::Unbalanced { template: template() });
        }

        let mut variants = vec![format!("{before}{after}")];
        if groups > 0 {
            variants.push(format!("{before}{group}{after}"));
        }
        variants.retain(|v| !v.is_empty());
        Ok(Self {
            source: template(),
            variants,
        })
    }

    /// Template as declared
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Concrete skeletons accepted, shortest first
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Check whether a skeleton is accepted
    #[must_use]
    pub fn matches(&self, skeleton: &str) -> bool {
        self.variants.iter().any(|v| v == skeleton)
    }
}

/// Ordered templates of a language. The first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    templates: Vec<SyllableTemplate>,
}

impl TemplateSet {
    /// Parse every template, keeping the valid ones in order and returning
    /// the errors for the rest.
    #[must_use]
    pub fn parse<S: AsRef<str>>(sources: &[S]) -> (Self, Vec<TemplateError>) {
        let mut templates = Vec::with_capacity(sources.len());
        let mut errors = Vec::new();
        for source in sources {
            match SyllableTemplate::parse(source.as_ref()) {
                Ok(t) => templates.push(t),
                Err(e) => errors.push(e),
            }
        }
        (Self { templates }, errors)
    }

    /// First template accepting the skeleton
    #[must_use]
    pub fn find(&self, skeleton: &str) -> Option<&SyllableTemplate> {
        self.templates.iter().find(|t| t.matches(skeleton))
    }

    /// Number of valid templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if no valid template exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Comma-separated declared templates, for messages
    #[must_use]
    pub fn describe(&self) -> String {
        self.templates
            .iter()
            .map(SyllableTemplate::source)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
