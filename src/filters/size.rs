//! Size validation filter
//!
//! Caps the byte length of each free-text field.

use super::{ContentFilter, Field};
use crate::error::ValidationError;

/// Filter that validates text field size limits
pub struct SizeFilter {
    max_bytes: u64,
}

impl SizeFilter {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl ContentFilter for SizeFilter {
    fn validate(&self, fields: &[Field<'_>]) -> Result<(), ValidationError> {
        for field in fields {
            if field.value.len() as u64 > self.max_bytes {
                return Err(ValidationError::TooLarge {
                    field: field.name,
                    limit: self.max_bytes,
                });
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "SizeFilter"
    }
}
