//! Error-class detection in runtime stderr and remediation suggestions.

use serde::{Deserialize, Serialize};

use super::runner::ExecutionOutput;
use crate::types::Language;

/// Runtime error class recognised in stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    SyntaxError,
    NameError,
    ReferenceError,
    TypeError,
}

const PYTHON_CLASSES: &[ErrorKind] = &[
    ErrorKind::SyntaxError,
    ErrorKind::NameError,
    ErrorKind::TypeError,
];

const JAVASCRIPT_CLASSES: &[ErrorKind] = &[
    ErrorKind::SyntaxError,
    ErrorKind::ReferenceError,
    ErrorKind::TypeError,
];

const ALL_CLASSES: &[ErrorKind] = &[
    ErrorKind::SyntaxError,
    ErrorKind::NameError,
    ErrorKind::ReferenceError,
    ErrorKind::TypeError,
];

impl ErrorKind {
    /// Tag used when rendering a detected error
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "syntax_error",
            ErrorKind::NameError => "name_error",
            ErrorKind::ReferenceError => "reference_error",
            ErrorKind::TypeError => "type_error",
        }
    }

    /// Substring searched for in each stderr line
    pub fn pattern(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::NameError => "NameError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::TypeError => "TypeError",
        }
    }

    /// Per-language table, in scan order. Languages without a table of
    /// their own are scanned for every known class.
    pub fn classes_for(language: &Language) -> &'static [ErrorKind] {
        match language {
            Language::Python => PYTHON_CLASSES,
            Language::JavaScript => JAVASCRIPT_CLASSES,
            _ => ALL_CLASSES,
        }
    }
}

/// One matched error class on one stderr line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedError {
    pub kind: ErrorKind,
    pub line: String,
}

impl std::fmt::Display for DetectedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.tag(), self.line)
    }
}

/// Corrective action the orchestrator knows how to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Remediation {
    /// Re-run statement terminator insertion over the candidate
    InsertTerminators,
    /// Hint only
    NoAction,
}

/// Human-readable hint paired with its action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub message: String,
    pub remediation: Remediation,
}

pub const SYNTAX_HINT: &str = "Check for missing brackets, parentheses, or semicolons";
pub const SCOPE_HINT: &str = "Verify all variables are properly declared and in scope";
pub const TYPE_HINT: &str = "Ensure proper type conversions and method compatibility";

impl Suggestion {
    fn new(message: &str, remediation: Remediation) -> Self {
        Self {
            message: message.to_string(),
            remediation,
        }
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Scan stderr of a failed execution. Successful executions yield nothing.
///
/// Every (line, class) match produces one entry, so a line naming two
/// classes yields two entries.
pub fn analyze_errors(output: &ExecutionOutput, classes: &[ErrorKind]) -> Vec<DetectedError> {
    if output.success() {
        return Vec::new();
    }

    output
        .stderr
        .split('\n')
        .flat_map(move |line| {
            classes
                .iter()
                .filter(move |kind| line.contains(kind.pattern()))
                .map(move |kind| DetectedError {
                    kind: *kind,
                    line: line.to_string(),
                })
        })
        .collect()
}

/// At most one suggestion per entry, chosen by the first matching class
/// name found anywhere in the rendered entry.
pub fn suggest(errors: &[DetectedError]) -> Vec<Suggestion> {
    errors
        .iter()
        .filter_map(|error| {
            let entry = error.to_string();
            if entry.contains("SyntaxError") {
                Some(Suggestion::new(SYNTAX_HINT, Remediation::InsertTerminators))
            } else if entry.contains("NameError") || entry.contains("ReferenceError") {
                Some(Suggestion::new(SCOPE_HINT, Remediation::NoAction))
            } else if entry.contains("TypeError") {
                Some(Suggestion::new(TYPE_HINT, Remediation::NoAction))
            } else {
                None
            }
        })
        .collect()
}
