use std::collections::HashMap;

use crate::config::{CategoryTier, DiversifyConfig};
use crate::types::ScoredCandidate;

/// Ordered multimap from category id to candidate positions.
///
/// Keys keep the order in which each category was first seen and every
/// bucket keeps the order in which its members were inserted. Diversification
/// depends on both: the "best two" of a category are simply the first two
/// entries of its bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryBuckets {
    keys: Vec<Option<i64>>,
    buckets: HashMap<Option<i64>, Vec<usize>>,
}

impl CategoryBuckets {
    /// Buckets positions `0..candidates.len()` by category.
    pub fn from_candidates(candidates: &[ScoredCandidate]) -> Self {
        let mut buckets = Self::default();
        for (position, candidate) in candidates.iter().enumerate() {
            buckets.push(candidate.category_id, position);
        }
        buckets
    }

    pub fn push(&mut self, category_id: Option<i64>, position: usize) {
        self.buckets
            .entry(category_id)
            .or_insert_with(|| {
                self.keys.push(category_id);
                Vec::new()
            })
            .push(position);
    }

    /// Members of `category_id` in insertion order.
    pub fn get(&self, category_id: Option<i64>) -> &[usize] {
        self.buckets
            .get(&category_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Category keys in first-seen order.
    pub fn keys(&self) -> &[Option<i64>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Tiered re-ordering for "build a project" searches.
///
/// Walks the tiers in order, then each tier's groups, then each group's
/// category ids, emitting up to `max_per_category` of the best remaining
/// candidates from each category. Whatever is left follows in its original
/// order. Categories missing from every tier only appear in that tail. The
/// output is always a permutation of the input.
#[derive(Debug, Clone, Copy)]
pub struct ProjectDiversifier<'a> {
    tiers: &'a [CategoryTier],
    max_per_category: usize,
}

impl<'a> ProjectDiversifier<'a> {
    pub fn new(tiers: &'a [CategoryTier], max_per_category: usize) -> Self {
        Self {
            tiers,
            max_per_category,
        }
    }

    pub fn from_config(cfg: &'a DiversifyConfig) -> Self {
        Self::new(&cfg.tiers, cfg.max_per_category)
    }

    /// Positions of `candidates` in diversified order.
    pub fn order(&self, candidates: &[ScoredCandidate]) -> Vec<usize> {
        let buckets = CategoryBuckets::from_candidates(candidates);
        let mut emitted = vec![false; candidates.len()];
        let mut order = Vec::with_capacity(candidates.len());

        for tier in self.tiers {
            for category_id in tier.category_ids() {
                let picks: Vec<usize> = buckets
                    .get(Some(category_id))
                    .iter()
                    .copied()
                    .filter(|&pos| !emitted[pos])
                    .take(self.max_per_category)
                    .collect();
                for pos in picks {
                    emitted[pos] = true;
                    order.push(pos);
                }
            }
        }

        order.extend((0..candidates.len()).filter(|&pos| !emitted[pos]));
        order
    }

    pub fn diversify(&self, candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        let order = self.order(&candidates);
        let mut slots: Vec<Option<ScoredCandidate>> = candidates.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|pos| slots[pos].take())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidates(categories: &[Option<i64>]) -> Vec<ScoredCandidate> {
        categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                ScoredCandidate::new(i as i64, i, *category, 1.0 - i as f32 * 0.01)
            })
            .collect()
    }

    fn tiers(spec: &[&[i64]]) -> Vec<CategoryTier> {
        spec.iter().map(|ids| CategoryTier::single(ids.to_vec())).collect()
    }

    fn ids(list: &[ScoredCandidate]) -> Vec<i64> {
        list.iter().map(|c| c.product_id).collect()
    }

    #[test]
    fn buckets_preserve_insertion_order() {
        let list = candidates(&[Some(4), Some(1), Some(4), None, Some(1)]);
        let buckets = CategoryBuckets::from_candidates(&list);
        assert_eq!(buckets.keys(), &[Some(4), Some(1), None]);
        assert_eq!(buckets.get(Some(4)), &[0, 2]);
        assert_eq!(buckets.get(Some(1)), &[1, 4]);
        assert_eq!(buckets.get(None), &[3]);
        assert!(buckets.get(Some(99)).is_empty());
        assert_eq!(buckets.len(), 3);
    }

    #[test]
    fn tier_walk_caps_each_category() {
        let list = candidates(&[
            Some(6),
            Some(1),
            Some(1),
            Some(1),
            Some(4),
            Some(7),
            Some(4),
            Some(4),
            Some(6),
        ]);
        let tiers = tiers(&[&[1], &[4], &[6, 7]]);
        let out = ProjectDiversifier::new(&tiers, 2).diversify(list);
        // 1,1 | 4,4 | 6,6,7 | leftovers in original order
        assert_eq!(ids(&out), vec![1, 2, 4, 6, 0, 8, 5, 3, 7]);
    }

    #[test]
    fn unlisted_categories_only_reach_the_tail() {
        let list = candidates(&[Some(99), None, Some(4), Some(99)]);
        let tiers = tiers(&[&[4]]);
        let out = ProjectDiversifier::new(&tiers, 2).diversify(list);
        assert_eq!(ids(&out), vec![2, 0, 1, 3]);
    }

    #[test]
    fn grouped_tier_walks_groups_in_order() {
        let list = candidates(&[Some(7), Some(6), Some(7), Some(6), Some(7)]);
        let tiers = vec![CategoryTier::grouped(vec![vec![7], vec![6]])];
        let out = ProjectDiversifier::new(&tiers, 1).diversify(list);
        assert_eq!(ids(&out), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn repeated_category_is_not_emitted_twice() {
        let list = candidates(&[Some(1), Some(1), Some(1)]);
        let tiers = tiers(&[&[1], &[1]]);
        let out = ProjectDiversifier::new(&tiers, 2).diversify(list);
        assert_eq!(ids(&out), vec![0, 1, 2]);
    }

    #[test]
    fn empty_input() {
        let tiers = tiers(&[&[1]]);
        assert!(ProjectDiversifier::new(&tiers, 2).diversify(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn diversify_is_a_permutation(
            categories in proptest::collection::vec(proptest::option::of(0i64..16), 0..120),
            cap in 1usize..4,
        ) {
            let list = candidates(&categories);
            let cfg = DiversifyConfig { max_per_category: cap, ..DiversifyConfig::default() };
            let out = ProjectDiversifier::from_config(&cfg).diversify(list.clone());

            prop_assert_eq!(out.len(), list.len());
            let mut before = ids(&list);
            let mut after = ids(&out);
            before.sort_unstable();
            after.sort_unstable();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn diversify_keeps_within_category_order(
            categories in proptest::collection::vec(proptest::option::of(0i64..16), 0..120),
        ) {
            let list = candidates(&categories);
            let cfg = DiversifyConfig::default();
            let out = ProjectDiversifier::from_config(&cfg).diversify(list);

            let mut last_seen: HashMap<Option<i64>, i64> = HashMap::new();
            for c in &out {
                if let Some(prev) = last_seen.insert(c.category_id, c.product_id) {
                    prop_assert!(prev < c.product_id);
                }
            }
        }
    }
}
