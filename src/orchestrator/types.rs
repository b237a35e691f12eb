//! Orchestration report types.

use serde::{Deserialize, Serialize};

use crate::planner::RuleCoverage;
use crate::validator::{Remediation, ValidationResult};

/// One validate-and-correct iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt: usize,
    /// Candidate that was validated in this attempt
    pub candidate: String,
    pub validation: ValidationResult,
    /// Actions executed after a failed validation
    pub applied: Vec<Remediation>,
}

/// How an orchestration run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The candidate validated at `attempt` passed
    Validated { code: String, attempt: usize },
    /// Every attempt failed validation.
    ///
    /// `last_candidate` is the output of the final correction. The loop ends
    /// before validating it, so `last_candidate_validated` is always false.
    BudgetExhausted {
        last_candidate: String,
        last_candidate_validated: bool,
    },
}

/// Full trace of one `translate_detailed` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationReport {
    pub outcome: Outcome,
    pub attempts: Vec<AttemptRecord>,
    pub plan_coverage: RuleCoverage,
}

impl OrchestrationReport {
    /// Validated code, or `None` when the budget ran out
    pub fn code(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Validated { code, .. } => Some(code),
            Outcome::BudgetExhausted { .. } => None,
        }
    }

    pub fn into_code(self) -> Option<String> {
        match self.outcome {
            Outcome::Validated { code, .. } => Some(code),
            Outcome::BudgetExhausted { .. } => None,
        }
    }

    pub fn is_validated(&self) -> bool {
        matches!(self.outcome, Outcome::Validated { .. })
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}
