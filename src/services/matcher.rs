//! Query matcher
//!
//! Turns a free-text query into search terms and looks up threats whose tags
//! contain any of them. Matching is literal, case-insensitive substring
//! containment; user text is never compiled into a pattern.

use std::sync::Arc;

use crate::db::{StoreError, ThreatStore};
use crate::models::Threat;

/// A single normalized (trimmed, lowercased) query term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring containment
    pub fn matches(&self, tag: &str) -> bool {
        tag.to_lowercase().contains(&self.0)
    }

    /// `%term%` for `ILIKE ... ESCAPE '\'`, with LIKE metacharacters escaped
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.0))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Query is required")]
    EmptyQuery,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Normalize a raw query into distinct terms, first occurrence first
pub fn normalize(query: &str) -> Vec<SearchTerm> {
    let lowered = query.trim().to_lowercase();
    let mut terms: Vec<SearchTerm> = Vec::new();

    for word in lowered.split_whitespace() {
        if !terms.iter().any(|t| t.0 == word) {
            terms.push(SearchTerm(word.to_string()));
        }
    }

    terms
}

/// Escape `\`, `%` and `_` so the text is a literal inside a LIKE pattern
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// First tag of the record that contains any of the terms
pub fn matched_tag<'a>(threat: &'a Threat, terms: &[SearchTerm]) -> Option<&'a str> {
    threat
        .tags
        .iter()
        .find(|tag| terms.iter().any(|term| term.matches(tag)))
        .map(String::as_str)
}

/// Tag matcher over a threat store
#[derive(Clone)]
pub struct QueryMatcher {
    store: Arc<dyn ThreatStore>,
    limit: i64,
}

impl QueryMatcher {
    pub fn new(store: Arc<dyn ThreatStore>, limit: i64) -> Self {
        Self { store, limit }
    }

    /// Most recent matches first, at most `limit`. Returns the terms used so
    /// callers can report which tag matched.
    pub async fn find(&self, query: &str) -> Result<(Vec<SearchTerm>, Vec<Threat>), MatchError> {
        let terms = normalize(query);
        if terms.is_empty() {
            return Err(MatchError::EmptyQuery);
        }

        tracing::debug!(
            "Searching for tags: {}",
            terms.iter().map(SearchTerm::as_str).collect::<Vec<_>>().join(", ")
        );

        let threats = self.store.find_by_tags(&terms, self.limit).await?;
        tracing::debug!("Tag search returned {} threats", threats.len());

        Ok((terms, threats))
    }
}
