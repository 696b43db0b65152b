use std::fmt;

/// A locator failed to parse or validate.
///
/// Validation collects every problem it finds, so one error may carry
/// several issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSyntaxError {
    pub issues: Vec<SyntaxIssue>,
}

impl LocatorSyntaxError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![SyntaxIssue::new(field, message)],
        }
    }

    /// Whether any issue names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for LocatorSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LocatorSyntaxError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// Offending field, e.g. `type`, `filters[1]`, `anchor.relation`.
    pub field: String,
    pub message: String,
}

impl SyntaxIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid locator field '{}': {}", self.field, self.message)
    }
}
