// Library exports for the codeshift translation pipeline
pub mod config;
pub mod orchestrator;
pub mod planner;
pub mod translator;
pub mod types;
pub mod validator;

// Re-export key types for convenience
pub use config::CodeshiftConfig;
pub use orchestrator::{AttemptRecord, OrchestrationReport, Orchestrator, Outcome};
pub use planner::{PlanBuilder, RuleBook, RuleCoverage, RuleSet, TranslationPlan};
pub use translator::{EvictionPolicy, Translation, TranslationCache, Translator};
pub use types::Language;
pub use validator::{
    CodeRunner, ExecutionOutput, ProcessRunner, Remediation, RunnerRegistry, ValidationError,
    ValidationResult, Validator,
};
