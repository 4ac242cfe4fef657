use serde_json::Value as JsonValue;

use crate::types::ScoredCandidate;

/// Which categories a request is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategorySelector {
    #[default]
    All,
    Only(i64),
}

impl CategorySelector {
    /// Reads the raw `category_id` request field.
    ///
    /// Anything that does not parse as an integer means "no filter", so a
    /// malformed value degrades instead of failing the request.
    pub fn from_request(value: Option<&JsonValue>) -> Self {
        value
            .and_then(parse_category_id)
            .map_or(Self::All, Self::Only)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Only(_))
    }

    pub fn matches(&self, category_id: Option<i64>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => category_id == Some(*wanted),
        }
    }

    /// Keeps matching candidates, preserving order.
    pub fn apply(&self, mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        if self.is_active() {
            candidates.retain(|c| self.matches(c.category_id));
        }
        candidates
    }
}

/// Integer JSON numbers and numeric strings (surrounding whitespace allowed).
/// Floats, booleans and everything else yield `None`.
pub fn parse_category_id(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
