//! Rule-Based Translator.
//!
//! Applies a [`TranslationPlan`]'s rule set to source text by literal
//! substring replacement, then runs target-specific post-processing:
//! 1. Cache lookup by exact (text, source language, target language)
//! 2. Syntax substitutions, in mapping order
//! 3. Library substitutions, in mapping order
//! 4. Post-processing (terminator insertion for terminated targets)
//! 5. Cache store
//!
//! Replacement is not tokenized: a rule can match inside identifiers, string
//! literals or comments.

mod cache;
mod postprocess;

pub use cache::{CacheKey, EvictionPolicy, TranslationCache};
pub use postprocess::{add_terminators, post_process};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::planner::{Mapping, RuleCoverage, TranslationPlan};

/// Translated code together with how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub code: String,
    pub coverage: RuleCoverage,
    pub cache_hit: bool,
}

/// Translator cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: Option<usize>,
    /// Number of times substitution actually ran (cache misses that did work)
    pub substitution_passes: u64,
}

/// Rule-based translator owning its memo cache
#[derive(Debug, Default)]
pub struct Translator {
    cache: TranslationCache,
    substitution_passes: u64,
}

impl Translator {
    pub fn new() -> Self {
        Self::with_cache(TranslationCache::unbounded())
    }

    pub fn with_cache(cache: TranslationCache) -> Self {
        debug!("Translation cache policy: {:?}", cache.policy());
        Self {
            cache,
            substitution_passes: 0,
        }
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self::with_cache(TranslationCache::new(policy))
    }

    /// Translate `source_code` according to `plan`
    pub fn translate(&mut self, source_code: &str, plan: &TranslationPlan) -> String {
        self.translate_with_coverage(source_code, plan).code
    }

    /// Translate and report whether rules were available and whether the
    /// result came from the cache
    pub fn translate_with_coverage(
        &mut self,
        source_code: &str,
        plan: &TranslationPlan,
    ) -> Translation {
        let coverage = plan.coverage();
        let key = CacheKey::new(source_code, &plan.source_language, &plan.target_language);

        if let Some(code) = self.cache.get(&key) {
            trace!(
                "Translation cache hit for {} -> {}",
                plan.source_language,
                plan.target_language
            );
            return Translation {
                code,
                coverage,
                cache_hit: true,
            };
        }

        let code = self.execute_translation(source_code, plan);
        self.cache.put(key, code.clone());

        Translation {
            code,
            coverage,
            cache_hit: false,
        }
    }

    fn execute_translation(&mut self, source_code: &str, plan: &TranslationPlan) -> String {
        self.substitution_passes += 1;
        debug!(
            "Translating {} -> {} ({} syntax rules, {} library rules)",
            plan.source_language,
            plan.target_language,
            plan.rule_set.syntax_mapping.len(),
            plan.rule_set.library_mapping.len()
        );

        let code = apply_mapping(source_code.to_string(), &plan.rule_set.syntax_mapping);
        let code = apply_mapping(code, &plan.rule_set.library_mapping);
        post_process(code, &plan.target_language)
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.cache.hits(),
            misses: self.cache.misses(),
            evictions: self.cache.evictions(),
            size: self.cache.len(),
            capacity: self.cache.capacity(),
            substitution_passes: self.substitution_passes,
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Replace every literal occurrence of each key, in mapping order
pub fn apply_mapping(mut code: String, mapping: &Mapping) -> String {
    for (from, to) in mapping {
        if from.is_empty() {
            continue;
        }
        code = code.replace(from.as_str(), to);
    }
    code
}
