//! Plan Builder.
//!
//! Produces a [`TranslationPlan`] for a (source, target) language pair: a
//! fixed list of descriptive steps plus the static rule set registered for
//! that pair. The rule set never depends on the source text.

mod rules;

pub use rules::{Mapping, RuleBook, RuleSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::Language;

/// Static rule bundle plus descriptive steps for one language pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPlan {
    pub source_language: Language,
    pub target_language: Language,
    /// Informational only; never drives control flow
    pub steps: Vec<String>,
    pub rule_set: RuleSet,
}

/// Whether a plan carries any substitution rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleCoverage {
    Applied { rules: usize },
    NoRules,
}

impl TranslationPlan {
    pub fn coverage(&self) -> RuleCoverage {
        match self.rule_set.rule_count() {
            0 => RuleCoverage::NoRules,
            rules => RuleCoverage::Applied { rules },
        }
    }
}

/// Builds translation plans from a [`RuleBook`]
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    rule_book: RuleBook,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::with_rule_book(RuleBook::reference())
    }

    pub fn with_rule_book(rule_book: RuleBook) -> Self {
        Self { rule_book }
    }

    pub fn rule_book(&self) -> &RuleBook {
        &self.rule_book
    }

    /// Create a plan. Unsupported pairs are not an error: they yield a plan
    /// whose three mappings are empty.
    pub fn create_plan(
        &self,
        _source_code: &str,
        source_lang: &Language,
        target_lang: &Language,
    ) -> TranslationPlan {
        let rule_set = self.rule_book.lookup(source_lang, target_lang);

        if rule_set.is_empty() {
            warn!(
                "No translation rules for {} -> {}; plan will leave code unchanged",
                source_lang, target_lang
            );
        } else {
            debug!(
                "Plan {} -> {}: {} syntax rules, {} library rules",
                source_lang,
                target_lang,
                rule_set.syntax_mapping.len(),
                rule_set.library_mapping.len()
            );
        }

        TranslationPlan {
            source_language: source_lang.clone(),
            target_language: target_lang.clone(),
            steps: plan_steps(source_lang, target_lang),
            rule_set,
        }
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn plan_steps(source: &Language, target: &Language) -> Vec<String> {
    let (src, tgt) = (source.tag(), target.tag());
    vec![
        format!("Analyze {} code structure and dependencies", src),
        format!("Identify {}-specific idioms", src),
        format!("Map {} constructs to {} equivalents", src, tgt),
        "Generate initial translation".to_string(),
        "Apply language-specific optimizations".to_string(),
    ]
}
