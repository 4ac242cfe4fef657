use catalog::CatalogSnapshot;
use std::collections::HashSet;

use crate::config::BoostConfig;
use crate::stemmer::stem;
use crate::types::{ScoredCandidate, SearchError};

/// Lowercase query word together with its stem, computed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub word: String,
    pub stem: String,
}

/// Lexical bonus on top of semantic similarity.
///
/// For every query word the product name is scanned word by word and the
/// first rule that fires wins:
///
/// | rule                         | bonus     |
/// |------------------------------|-----------|
/// | same stem, non-generic word  | `exact`   |
/// | same stem, generic word      | `generic` |
/// | one word contains the other  | `partial` |
///
/// A query word therefore contributes at most once per product.
#[derive(Debug, Clone)]
pub struct KeywordBooster {
    exact: f32,
    generic: f32,
    partial: f32,
    generic_words: HashSet<String>,
}

impl KeywordBooster {
    pub fn new(cfg: &BoostConfig) -> Self {
        Self {
            exact: cfg.exact,
            generic: cfg.generic,
            partial: cfg.partial,
            generic_words: cfg.generic_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn query_terms(query: &str) -> Vec<QueryTerm> {
        query
            .to_lowercase()
            .split_whitespace()
            .map(|word| QueryTerm {
                stem: stem(word),
                word: word.to_owned(),
            })
            .collect()
    }

    /// Bonus earned by `product_name` for the given query terms.
    pub fn score(&self, terms: &[QueryTerm], product_name: &str) -> f32 {
        let name = product_name.to_lowercase();
        let name_words: Vec<(&str, String)> = name
            .split_whitespace()
            .map(|word| (word, stem(word)))
            .collect();

        let mut boost = 0.0;
        for term in terms {
            for (word, word_stem) in &name_words {
                if term.stem == *word_stem {
                    boost += if self.generic_words.contains(&term.word) {
                        self.generic
                    } else {
                        self.exact
                    };
                    break;
                }
                if word.contains(term.word.as_str()) || term.word.contains(word) {
                    boost += self.partial;
                    break;
                }
            }
        }
        boost
    }

    /// Boosts every candidate and re-sorts by final score.
    ///
    /// The sort is stable: candidates with equal final scores keep the order
    /// they arrived in, which is the semantic-score order.
    pub fn apply(
        &self,
        query: &str,
        candidates: &mut [ScoredCandidate],
        snapshot: &CatalogSnapshot,
    ) -> Result<(), SearchError> {
        let terms = Self::query_terms(query);
        for candidate in candidates.iter_mut() {
            let record = snapshot
                .by_row(candidate.row)
                .ok_or(SearchError::UnknownRow(candidate.row as i64))?;
            candidate.set_boost(self.score(&terms, &record.name));
        }
        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        Ok(())
    }
}
