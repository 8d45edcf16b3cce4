//! In-memory rule catalogue

use crate::rule::{RuleDef, RuleError};
use std::collections::HashMap;
use thiserror::Error;

/// Error registering a rule
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Invalid(#[from] RuleError),

    /// A rule with this id is already registered. Registration rejects
    /// duplicates rather than silently overwriting them, which would hide
    /// authoring mistakes; the manifest is assembled exactly once at
    /// startup, so idempotent re-registration is not needed.
    #[error("rule '{id}' is already registered")]
    DuplicateId { id: String },
}

/// Catalogue of all known rules, keyed by identifier and queryable by
/// category. Registration order is preserved and defines the order rules
/// run in.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RuleDef>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a rule manifest, halting on the first
    /// definition error
    pub fn from_rules<I>(rules: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = RuleDef>,
    {
        let mut registry = Self::new();
        registry.register_all(rules)?;
        Ok(registry)
    }

    /// Validate and register a single rule
    pub fn register(&mut self, rule: RuleDef) -> Result<(), RegistryError> {
        rule.validate()?;

        if self.index.contains_key(&rule.id) {
            return Err(RegistryError::DuplicateId {
                id: rule.id.clone(),
            });
        }

        self.index.insert(rule.id.clone(), self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    /// Register every rule in an iterator, stopping at the first error
    pub fn register_all<I>(&mut self, rules: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = RuleDef>,
    {
        for rule in rules {
            self.register(rule)?;
        }
        Ok(())
    }

    /// All rules in registration order
    pub fn all(&self) -> &[RuleDef] {
        &self.rules
    }

    /// Rules in a category, in registration order
    pub fn by_category(&self, category: &str) -> Vec<&RuleDef> {
        self.rules
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Look up a rule by identifier
    pub fn get(&self, id: &str) -> Option<&RuleDef> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.rules.iter().map(|r| r.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Remove every rule (test isolation)
    pub fn clear(&mut self) {
        self.rules.clear();
        self.index.clear();
    }

    /// Total registered rule count
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
