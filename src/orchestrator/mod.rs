//! Plan → Translate → Validate correction loop.
//!
//! The orchestrator builds a plan, translates once, then alternates
//! validation and correction until a candidate validates or the attempt
//! budget runs out:
//! 1. Validate the current candidate in the target runtime
//! 2. Valid: return it
//! 3. Invalid: execute the remediation actions it knows
//!    (`Remediation::InsertTerminators`), count the attempt, loop
//!
//! The candidate produced by the final correction is not validated; the
//! budget check ends the loop first.

mod types;

pub use types::{AttemptRecord, OrchestrationReport, Outcome};

use anyhow::{Context as AnyhowContext, Result};
use tracing::{debug, info, warn};

use crate::config::CodeshiftConfig;
use crate::planner::{PlanBuilder, RuleCoverage};
use crate::translator::{add_terminators, Translator};
use crate::types::Language;
use crate::validator::{Remediation, ValidationResult, Validator};

/// Reference attempt budget
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Ties planner, translator and validator together
#[derive(Debug)]
pub struct Orchestrator {
    planner: PlanBuilder,
    translator: Translator,
    validator: Validator,
    max_attempts: usize,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            planner: PlanBuilder::new(),
            translator: Translator::new(),
            validator: Validator::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Build every stage from configuration
    pub fn from_config(config: &CodeshiftConfig) -> Self {
        Self {
            planner: PlanBuilder::new(),
            translator: Translator::with_policy(config.translation.cache.eviction_policy()),
            validator: Validator::new(config.validation.registry()),
            max_attempts: config.translation.max_correction_attempts,
        }
    }

    pub fn with_planner(mut self, planner: PlanBuilder) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Translate and validate. `Ok(None)` means the attempt budget ran out.
    pub fn translate_code(
        &mut self,
        source_code: &str,
        source_lang: &Language,
        target_lang: &Language,
    ) -> Result<Option<String>> {
        Ok(self
            .translate_detailed(source_code, source_lang, target_lang)?
            .into_code())
    }

    /// Same loop as [`translate_code`](Self::translate_code), returning every
    /// attempt and the explicit outcome
    pub fn translate_detailed(
        &mut self,
        source_code: &str,
        source_lang: &Language,
        target_lang: &Language,
    ) -> Result<OrchestrationReport> {
        info!("Translating {} -> {}", source_lang, target_lang);

        let plan = self
            .planner
            .create_plan(source_code, source_lang, target_lang);
        let translation = self.translator.translate_with_coverage(source_code, &plan);
        if translation.coverage == RuleCoverage::NoRules {
            warn!(
                "No rules for {} -> {}; validating untranslated code",
                source_lang, target_lang
            );
        }

        let mut candidate = translation.code;
        let mut attempts = Vec::new();

        for attempt in 1..=self.max_attempts {
            let validation = self
                .validator
                .validate(&candidate, target_lang)
                .with_context(|| format!("Validation attempt {} failed to run", attempt))?;

            if validation.is_valid {
                info!("Candidate validated on attempt {}", attempt);
                attempts.push(AttemptRecord {
                    attempt,
                    candidate: candidate.clone(),
                    validation,
                    applied: Vec::new(),
                });
                return Ok(OrchestrationReport {
                    outcome: Outcome::Validated {
                        code: candidate,
                        attempt,
                    },
                    attempts,
                    plan_coverage: translation.coverage,
                });
            }

            info!(
                "Attempt {}/{}: {} error(s)",
                attempt,
                self.max_attempts,
                validation.errors.len()
            );

            let (corrected, applied) = apply_corrections(&candidate, &validation);
            attempts.push(AttemptRecord {
                attempt,
                candidate,
                validation,
                applied,
            });
            candidate = corrected;
        }

        warn!(
            "Correction budget of {} attempt(s) exhausted",
            self.max_attempts
        );
        Ok(OrchestrationReport {
            outcome: Outcome::BudgetExhausted {
                last_candidate: candidate,
                last_candidate_validated: false,
            },
            attempts,
            plan_coverage: translation.coverage,
        })
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute the remediation actions of a failed validation, once per
/// suggestion. Returns the corrected code and the actions that ran.
pub fn apply_corrections(code: &str, validation: &ValidationResult) -> (String, Vec<Remediation>) {
    let mut corrected = code.to_string();
    let mut applied = Vec::new();

    for suggestion in &validation.suggestions {
        match suggestion.remediation {
            Remediation::InsertTerminators => {
                corrected = add_terminators(&corrected);
                applied.push(Remediation::InsertTerminators);
            }
            Remediation::NoAction => {
                debug!("No corrective action for: {}", suggestion.message);
            }
        }
    }

    (corrected, applied)
}
