//! Filter factory for creating filter chains from configuration
//!
//! An empty `filters` list yields the standard chain: [`SizeFilter`] with the
//! configured text limit, then [`BannedWordsFilter`].

use super::banned::{BannedWords, BannedWordsFilter};
use super::size::SizeFilter;
use super::{ContentFilter, FilterChain};
use crate::config::FilterConfig;
use std::error::Error;
use std::sync::Arc;

/// Shared services filters may be built around.
pub struct FilterDeps {
    pub banned_words: Arc<BannedWords>,
    pub max_text_bytes: Option<u64>,
}

/// Errors that can occur when creating filters from configuration
#[derive(Debug, Clone)]
pub enum FilterFactoryError {
    /// Unknown filter name
    UnknownFilter(String),
    /// Invalid parameters for a filter
    InvalidParameters(String),
}

impl std::fmt::Display for FilterFactoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterFactoryError::UnknownFilter(name) => write!(f, "Unknown filter: {name}"),
            FilterFactoryError::InvalidParameters(msg) => {
                write!(f, "Invalid filter parameters: {msg}")
            }
        }
    }
}

impl Error for FilterFactoryError {}

fn size_filter(config: Option<&FilterConfig>, deps: &FilterDeps) -> Result<SizeFilter, FilterFactoryError> {
    let override_bytes = match config.and_then(|c| c.parameters.get("max_bytes")) {
        None => None,
        Some(value) => Some(
            value
                .as_u64()
                .or_else(|| value.as_str().and_then(crate::config::parse_size))
                .ok_or_else(|| {
                    FilterFactoryError::InvalidParameters(format!(
                        "SizeFilter max_bytes must be a size, got {value}"
                    ))
                })?,
        ),
    };
    let max = override_bytes.or(deps.max_text_bytes).unwrap_or(u64::MAX);
    Ok(SizeFilter::new(max))
}

/// Create a filter instance from configuration
pub fn create_filter(
    config: &FilterConfig,
    deps: &FilterDeps,
) -> Result<Box<dyn ContentFilter>, FilterFactoryError> {
    match config.name.as_str() {
        "SizeFilter" => Ok(Box::new(size_filter(Some(config), deps)?)),
        "BannedWordsFilter" => Ok(Box::new(BannedWordsFilter::new(deps.banned_words.clone()))),
        _ => Err(FilterFactoryError::UnknownFilter(config.name.clone())),
    }
}

/// Create a filter chain from a list of filter configurations
pub fn create_filter_chain(
    configs: &[FilterConfig],
    deps: &FilterDeps,
) -> Result<FilterChain, FilterFactoryError> {
    if configs.is_empty() {
        return Ok(FilterChain::new()
            .add_filter(Box::new(size_filter(None, deps)?))
            .add_filter(Box::new(BannedWordsFilter::new(deps.banned_words.clone()))));
    }

    let mut chain = FilterChain::new();
    for config in configs {
        chain = chain.add_filter(create_filter(config, deps)?);
    }
    Ok(chain)
}
