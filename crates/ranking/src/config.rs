//! Tunables for the ranking pipeline.
//!
//! Everything here is data, not algorithm: the boost weights, the generic
//! word list, the project trigger list and the category tiers all come from
//! configuration and default to the values the catalog was tuned with.

use index::AnnConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_RETRIEVAL_K: usize = 250;
pub const DEFAULT_MAX_PER_CATEGORY: usize = 2;

const GENERIC_WORDS: &[&str] = &[
    "tool",
    "kit",
    "set",
    "supply",
    "supplies",
    "wire",
    "paste",
    "wick",
    "device",
    "instrument",
    "apparatus",
    "equipment",
    "implement",
    "module",
];

const PROJECT_KEYWORDS: &[&str] = &[
    "build",
    "make",
    "project",
    "kit",
    "materials for",
    "starter",
    "robot",
    "radio",
    "construct",
    "assemble",
    "create",
    "fabricate",
    "develop",
    "design",
    "craft",
    "implement",
    "integrate",
    "engineer",
    "prototype",
];

/// Core components first, then mechanical parts, tools, and so on.
const DEFAULT_TIERS: &[&[i64]] = &[
    &[1],
    &[4],
    &[6, 7],
    &[2, 3, 8, 9, 10, 11],
    &[5, 12],
    &[13, 14],
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("retrieval_k must be greater than zero")]
    ZeroRetrievalK,
    #[error("boost.{name} must be non-negative, got {value}")]
    NegativeBoost { name: &'static str, value: f32 },
    #[error("diversify.max_per_category must be greater than zero")]
    ZeroCategoryCap,
    #[error("category {0} appears in more than one diversification tier or group")]
    DuplicateTierCategory(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of nearest neighbours requested from the vector index.
    pub retrieval_k: usize,
    pub boost: BoostConfig,
    pub diversify: DiversifyConfig,
    pub ann: AnnConfig,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            retrieval_k: DEFAULT_RETRIEVAL_K,
            boost: BoostConfig::default(),
            diversify: DiversifyConfig::default(),
            ann: AnnConfig::default(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval_k == 0 {
            return Err(ConfigError::ZeroRetrievalK);
        }
        for (name, value) in [
            ("exact", self.boost.exact),
            ("generic", self.boost.generic),
            ("partial", self.boost.partial),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::NegativeBoost { name, value });
            }
        }
        if self.diversify.max_per_category == 0 {
            return Err(ConfigError::ZeroCategoryCap);
        }
        let mut seen = HashSet::new();
        for tier in &self.diversify.tiers {
            for category_id in tier.category_ids() {
                if !seen.insert(category_id) {
                    return Err(ConfigError::DuplicateTierCategory(category_id));
                }
            }
        }
        Ok(())
    }
}

/// Keyword boost weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Stem match on a non-generic word.
    pub exact: f32,
    /// Stem match on a word from [`generic_words`](Self::generic_words).
    pub generic: f32,
    /// Query word and name word contain one another.
    pub partial: f32,
    pub generic_words: Vec<String>,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            exact: 1.0,
            generic: 0.2,
            partial: 0.5,
            generic_words: GENERIC_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversifyConfig {
    /// Substrings of the lowercase query that mark a "build a project" search.
    pub project_keywords: Vec<String>,
    pub tiers: Vec<CategoryTier>,
    /// Items promoted per category while walking the tiers.
    pub max_per_category: usize,
}

impl Default for DiversifyConfig {
    fn default() -> Self {
        Self {
            project_keywords: PROJECT_KEYWORDS.iter().map(|w| w.to_string()).collect(),
            tiers: DEFAULT_TIERS
                .iter()
                .map(|ids| CategoryTier::single(ids.to_vec()))
                .collect(),
            max_per_category: DEFAULT_MAX_PER_CATEGORY,
        }
    }
}

impl DiversifyConfig {
    /// Whether `query` reads like a project/build search.
    pub fn is_project_query(&self, query: &str) -> bool {
        let lower = query.to_lowercase();
        self.project_keywords
            .iter()
            .any(|keyword| lower.contains(keyword.as_str()))
    }
}

/// One priority level of the diversification walk.
///
/// A tier holds ordered groups of category ids. In configuration a tier is
/// written either as a flat list (`[6, 7]`, one group) or as a list of groups
/// (`[[6], [7]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TierRepr", into = "TierRepr")]
pub struct CategoryTier {
    pub groups: Vec<Vec<i64>>,
}

impl CategoryTier {
    /// A tier made of a single group.
    pub fn single(category_ids: Vec<i64>) -> Self {
        Self {
            groups: vec![category_ids],
        }
    }

    pub fn grouped(groups: Vec<Vec<i64>>) -> Self {
        Self { groups }
    }

    /// All category ids of the tier in walk order.
    pub fn category_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.iter().flatten().copied()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TierRepr {
    Flat(Vec<i64>),
    Grouped(Vec<Vec<i64>>),
}

impl From<TierRepr> for CategoryTier {
    fn from(repr: TierRepr) -> Self {
        match repr {
            TierRepr::Flat(ids) => CategoryTier::single(ids),
            TierRepr::Grouped(groups) => CategoryTier::grouped(groups),
        }
    }
}

impl From<CategoryTier> for TierRepr {
    fn from(mut tier: CategoryTier) -> Self {
        if tier.groups.len() == 1 {
            TierRepr::Flat(tier.groups.remove(0))
        } else {
            TierRepr::Grouped(tier.groups)
        }
    }
}
