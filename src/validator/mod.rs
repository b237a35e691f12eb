//! External Execution Validator.
//!
//! Runs candidate code through the target language's own runtime, scans the
//! stderr of failed runs for known error classes and pairs each detected
//! error with a remediation suggestion.

mod analysis;
mod runner;

pub use analysis::{
    analyze_errors, suggest, DetectedError, ErrorKind, Remediation, Suggestion, SCOPE_HINT,
    SYNTAX_HINT, TYPE_HINT,
};
pub use runner::{CodeRunner, ExecutionOutput, ProcessRunner, RunnerRegistry};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::Language;

/// Failures that prevent validation from producing a result
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No runtime registered for language: {0}")]
    UnsupportedLanguage(Language),

    #[error("Runtime '{program}' for {language} not found in PATH")]
    RuntimeNotFound { language: Language, program: String },

    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Outcome of one validation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<DetectedError>,
    pub suggestions: Vec<Suggestion>,
    pub execution: ExecutionOutput,
}

impl ValidationResult {
    pub fn from_execution(execution: ExecutionOutput, classes: &[ErrorKind]) -> Self {
        let errors = analyze_errors(&execution, classes);
        let suggestions = suggest(&errors);
        Self {
            is_valid: errors.is_empty(),
            errors,
            suggestions,
            execution,
        }
    }

    /// Errors rendered as `"kind: line"`
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Distinct remediation actions, in first-seen order
    pub fn actions(&self) -> Vec<Remediation> {
        let mut actions = Vec::new();
        for suggestion in &self.suggestions {
            if !actions.contains(&suggestion.remediation) {
                actions.push(suggestion.remediation);
            }
        }
        actions
    }
}

/// Validates code by executing it with a registered runner
#[derive(Debug)]
pub struct Validator {
    registry: RunnerRegistry,
}

impl Validator {
    pub fn new(registry: RunnerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RunnerRegistry {
        &self.registry
    }

    pub fn validate(
        &self,
        code: &str,
        language: &Language,
    ) -> Result<ValidationResult, ValidationError> {
        let runner = self.registry.get(language)?;
        let execution = runner.run(code)?;
        debug!(
            "{} exited with {:?} ({} bytes stderr)",
            language,
            execution.exit_code,
            execution.stderr.len()
        );

        let result = ValidationResult::from_execution(execution, runner.error_classes());
        if !result.is_valid {
            info!(
                "Validation found {} error(s) in {} code",
                result.errors.len(),
                language
            );
        }
        Ok(result)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(RunnerRegistry::with_defaults(None))
    }
}
