//! Glob-like name filters for listing operations.
//!
//! A pattern is one or more alternatives separated by `|`; trailing empty
//! alternatives are dropped, so `"orders|"` is just `"orders"`. Within an
//! alternative `?` matches one character, `*` matches any run, and `^`/`$`
//! are literal. All other characters reach the regex engine as written, so
//! `.` still matches any character and unbalanced groups fail to compile.
//! Matching is case-insensitive against the normalized name and must cover
//! the whole name.

use crate::error::{CacheError, Result};
use crate::keys::normalize_identifier;
use mini_moka::sync::Cache;
use regex::Regex;
use std::time::Duration;

/// A compiled name pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    alternatives: Vec<Regex>,
}

impl NamePattern {
    /// Compile `pattern`. The first alternative that fails to compile makes
    /// the whole pattern invalid.
    pub fn compile(pattern: &str) -> Result<Self> {
        let alternatives = split_alternatives(pattern.trim())
            .into_iter()
            .map(|alt| {
                Regex::new(&translate(alt))
                    .map_err(|e| CacheError::invalid_pattern(pattern, alt, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source: pattern.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the normalized `name` fully matches any alternative.
    pub fn matches(&self, name: &str) -> bool {
        let name = normalize_identifier(name);
        self.alternatives.iter().any(|re| re.is_match(&name))
    }
}

/// Compile `pattern` and test `name` against it.
pub fn matches(name: &str, pattern: &str) -> Result<bool> {
    Ok(NamePattern::compile(pattern)?.matches(name))
}

/// Split on `|` and drop trailing empty alternatives. A pattern without any
/// `|` is a single alternative, even when empty; `"|"` has none and matches
/// nothing.
fn split_alternatives(pattern: &str) -> Vec<&str> {
    let mut alternatives: Vec<&str> = pattern.split('|').collect();
    if alternatives.len() > 1 {
        while alternatives.last().is_some_and(|alt| alt.is_empty()) {
            alternatives.pop();
        }
    }
    alternatives
}

/// Anchored, case-insensitive regex for one alternative.
fn translate(alternative: &str) -> String {
    let mut re = String::with_capacity(alternative.len() + 12);
    re.push_str("(?i)^(?:");
    for c in alternative.chars() {
        match c {
            '?' => re.push('.'),
            '*' => re.push_str(".*"),
            '^' => re.push_str(r"\^"),
            '$' => re.push_str(r"\$"),
            other => re.push(other),
        }
    }
    re.push_str(")$");
    re
}

/// Bounded, time-limited memo of compiled patterns keyed by their raw text.
pub struct PatternCache {
    compiled: Cache<String, NamePattern>,
}

impl PatternCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            compiled: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(capacity)
                .build(),
        }
    }

    /// Compiled form of `pattern`, compiling and remembering it on first use.
    /// Invalid patterns are not remembered.
    pub fn get_or_compile(&self, pattern: &str) -> Result<NamePattern> {
        let key = pattern.to_string();
        if let Some(compiled) = self.compiled.get(&key) {
            return Ok(compiled);
        }
        let compiled = NamePattern::compile(pattern)?;
        self.compiled.insert(key, compiled.clone());
        Ok(compiled)
    }

    pub fn invalidate_all(&self) {
        self.compiled.invalidate_all();
    }
}
