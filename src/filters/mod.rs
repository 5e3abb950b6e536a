//! Free-text screening filters
//!
//! Every user-supplied text field of a new idea or comment runs through a
//! [`FilterChain`] before anything is written. A chain is an ordered list of
//! [`ContentFilter`]s; the first rejection wins.

use crate::error::ValidationError;

pub mod banned;
pub mod factory;
pub mod size;

pub use banned::BannedWords;

/// One named text field of a submission.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: &'a str,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: &'a str) -> Self {
        Self { name, value }
    }
}

/// Trait for submission filters
pub trait ContentFilter: Send + Sync {
    /// Returns Ok(()) if every field passes this filter.
    fn validate(&self, fields: &[Field<'_>]) -> Result<(), ValidationError>;

    /// Get a descriptive name for this filter (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// A chain of filters that all must pass for validation to succeed
pub struct FilterChain {
    filters: Vec<Box<dyn ContentFilter>>,
}

impl FilterChain {
    /// Create a new empty filter chain
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the chain
    pub fn add_filter(mut self, filter: Box<dyn ContentFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Run all filters in the chain, returning on first failure
    pub fn validate(&self, fields: &[Field<'_>]) -> Result<(), ValidationError> {
        for filter in &self.filters {
            if let Err(e) = filter.validate(fields) {
                tracing::info!(filter = filter.name(), reason = %e, "submission rejected");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Get a list of filter names in the chain
    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}
