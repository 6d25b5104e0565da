use std::fmt;

/// Why a section refused to let the wizard move forward.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub section: String,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Titles of mandatory fields that are unset.
    MissingFields(Vec<String>),
    InvalidValue { pointer: String, message: String },
    Rule { message: String },
}

impl ValidationIssue {
    pub fn message(&self) -> String {
        match self {
            ValidationIssue::MissingFields(titles) => {
                format!("Please fill in all mandatory fields: {}", titles.join(", "))
            }
            ValidationIssue::InvalidValue { message, .. } => message.clone(),
            ValidationIssue::Rule { message } => message.clone(),
        }
    }
}

impl ValidationError {
    pub fn new(section: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        Self {
            section: section.into(),
            issues,
        }
    }

    pub fn single(section: impl Into<String>, issue: ValidationIssue) -> Self {
        Self::new(section, vec![issue])
    }

    /// The message to show first; further issues are in `issues`.
    pub fn reason(&self) -> String {
        self.issues
            .first()
            .map(ValidationIssue::message)
            .unwrap_or_else(|| format!("section '{}' is invalid", self.section))
    }

    pub fn missing_fields(&self) -> &[String] {
        self.issues
            .iter()
            .find_map(|issue| match issue {
                ValidationIssue::MissingFields(titles) => Some(titles.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn has_rule_failure(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::Rule { .. }))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ValidationIssue::message).collect();
        if messages.is_empty() {
            return write!(f, "section '{}' is invalid", self.section);
        }
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}
