//! Token substitution rule tables keyed by language pair.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Language;

/// Ordered token -> token substitutions
pub type Mapping = IndexMap<String, String>;

/// Three named substitution mappings, applied literally to source text.
///
/// Mappings keep insertion order; later substitutions see the output of
/// earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub syntax_mapping: Mapping,
    pub library_mapping: Mapping,
    /// Reserved; no rule book populates it yet
    pub idiom_mapping: Mapping,
}

impl RuleSet {
    pub fn new(syntax: &[(&str, &str)], library: &[(&str, &str)]) -> Self {
        Self {
            syntax_mapping: to_mapping(syntax),
            library_mapping: to_mapping(library),
            idiom_mapping: Mapping::new(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.syntax_mapping.len() + self.library_mapping.len() + self.idiom_mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}

fn to_mapping(pairs: &[(&str, &str)]) -> Mapping {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Rule sets for every supported (source, target) pair
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: HashMap<(Language, Language), RuleSet>,
}

impl RuleBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in book: only python -> javascript carries substitutions.
    pub fn reference() -> Self {
        let mut book = Self::empty();
        book.insert(
            Language::Python,
            Language::JavaScript,
            RuleSet::new(
                &[
                    ("def", "function"),
                    ("elif", "else if"),
                    ("None", "null"),
                    ("True", "true"),
                    ("False", "false"),
                ],
                &[("print", "console.log"), ("len", ".length")],
            ),
        );
        book
    }

    /// Register (or replace) the rule set for a language pair
    pub fn insert(&mut self, source: Language, target: Language, rules: RuleSet) {
        self.rules.insert((source, target), rules);
    }

    /// Rule set for a pair; unknown pairs resolve to three empty mappings.
    pub fn lookup(&self, source: &Language, target: &Language) -> RuleSet {
        self.rules
            .get(&(source.clone(), target.clone()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn supports(&self, source: &Language, target: &Language) -> bool {
        self.rules
            .get(&(source.clone(), target.clone()))
            .is_some_and(|rules| !rules.is_empty())
    }

    pub fn pairs(&self) -> Vec<(Language, Language)> {
        let mut pairs: Vec<_> = self.rules.keys().cloned().collect();
        pairs.sort_by(|a, b| (a.0.tag(), a.1.tag()).cmp(&(b.0.tag(), b.1.tag())));
        pairs
    }
}
