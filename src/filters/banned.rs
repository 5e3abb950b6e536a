//! Banned-word moderation
//!
//! The term list lives in an editable text file, one term per line. Terms are
//! matched as literal, case-insensitive substrings through a single compiled
//! alternation. The compiled pattern is swapped only by an explicit reload.

use super::{ContentFilter, Field};
use crate::error::ValidationError;
use regex::{Regex, RegexBuilder};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

const PATTERN_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Terms from a list file: trimmed, blank lines dropped.
pub fn parse_terms(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Compile terms into one pattern. `None` when there is nothing to ban.
pub fn compile(terms: &[&str]) -> Result<Option<Regex>, regex::Error> {
    if terms.is_empty() {
        return Ok(None);
    }
    let union = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&union)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map(Some)
}

pub struct BannedWords {
    path: PathBuf,
    pattern: RwLock<Option<Regex>>,
}

impl BannedWords {
    /// An empty list bound to `path`; nothing is read until [`BannedWords::reload`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pattern: RwLock::new(None),
        }
    }

    /// Bind to `path` and load it immediately.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let words = Self::new(path);
        words.reload();
        words
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the list file and swap the compiled pattern. A missing or
    /// unreadable file leaves nothing banned. Returns the number of terms.
    pub fn reload(&self) -> usize {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no banned word list, nothing is banned");
                String::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read banned word list");
                String::new()
            }
        };
        let terms = parse_terms(&text);
        match compile(&terms) {
            Ok(pattern) => {
                self.swap(pattern);
                tracing::info!(terms = terms.len(), "banned word list loaded");
                terms.len()
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot compile banned word list");
                self.swap(None);
                0
            }
        }
    }

    fn swap(&self, pattern: Option<Regex>) {
        *self.pattern.write().unwrap_or_else(PoisonError::into_inner) = pattern;
    }

    /// True if `text` contains any banned term.
    pub fn screen(&self, text: &str) -> bool {
        self.pattern
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|re| re.is_match(text))
    }

    /// Current raw list text; empty when the file does not exist.
    pub async fn read_text(&self) -> io::Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Replace the list file and reload. The new text is compiled before the
    /// file is touched, so a rejected list leaves the old one in force.
    pub async fn replace(&self, content: &str) -> Result<usize, ReplaceError> {
        let terms = parse_terms(content);
        let pattern = compile(&terms).map_err(|e| ReplaceError::Invalid(e.to_string()))?;
        tokio::fs::write(&self.path, content).await?;
        self.swap(pattern);
        tracing::info!(terms = terms.len(), "banned word list replaced");
        Ok(terms.len())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    #[error("banned word list cannot be compiled: {0}")]
    Invalid(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Rejects any field containing a banned term.
pub struct BannedWordsFilter {
    words: Arc<BannedWords>,
}

impl BannedWordsFilter {
    pub fn new(words: Arc<BannedWords>) -> Self {
        Self { words }
    }
}

impl ContentFilter for BannedWordsFilter {
    fn validate(&self, fields: &[Field<'_>]) -> Result<(), ValidationError> {
        if fields.iter().any(|f| self.words.screen(f.value)) {
            return Err(ValidationError::BannedContent);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "BannedWordsFilter"
    }
}
