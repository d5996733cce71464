//! Credibility-weighted ranking of catalog items.
//!
//! Items are ordered by a Bayesian average of their own rating and a neutral
//! prior, so a title with a handful of perfect votes cannot outrank one with
//! thousands of strong votes. Items with too little signal are dropped before
//! scoring.

use serde::Serialize;

use crate::models::CatalogItem;

/// Rating signal exposed by anything the ranker can order.
///
/// `None` means the provider did not supply a usable value; such items never
/// pass the admission filter.
pub trait Rated {
    fn vote_count(&self) -> Option<u64>;
    fn vote_average(&self) -> Option<f64>;
    fn popularity(&self) -> Option<f64>;
}

impl Rated for CatalogItem {
    fn vote_count(&self) -> Option<u64> {
        self.vote_count
    }

    fn vote_average(&self) -> Option<f64> {
        self.vote_average
    }

    fn popularity(&self) -> Option<f64> {
        self.popularity
    }
}

/// Tunables for the weighted rating and the admission filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankConfig {
    /// Rating assumed for an item with no votes
    pub prior_mean: f64,
    /// Number of virtual votes backing the prior
    pub prior_weight: f64,
    /// Items with fewer votes are dropped
    pub min_vote_count: u64,
    /// Items must rate strictly above this
    pub min_vote_average: f64,
    /// Items less popular than this are dropped
    pub min_popularity: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            prior_mean: 7.0,
            prior_weight: 300.0,
            min_vote_count: 50,
            min_vote_average: 0.0,
            min_popularity: 200.0,
        }
    }
}

/// An item together with its weighted rating
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredItem<T> {
    #[serde(flatten)]
    pub item: T,
    pub score: f64,
}

impl RankConfig {
    /// Whether an item carries enough rating signal to be ranked
    pub fn admits<T: Rated>(&self, item: &T) -> bool {
        let enough_votes = item
            .vote_count()
            .is_some_and(|v| v >= self.min_vote_count);
        let rated = item
            .vote_average()
            .is_some_and(|r| r.is_finite() && r > self.min_vote_average);
        let popular = item
            .popularity()
            .is_some_and(|p| p.is_finite() && p >= self.min_popularity);

        enough_votes && rated && popular
    }

    /// Blend of the item's own average `r` over `v` votes with the prior
    pub fn weighted_rating(&self, v: u64, r: f64) -> f64 {
        let v = v as f64;
        let total = v + self.prior_weight;
        (v / total) * r + (self.prior_weight / total) * self.prior_mean
    }
}

/// Filters, scores and orders `items` by descending weighted rating.
///
/// The input is left untouched. When `limit` is given only the first `limit`
/// items of the sorted result are returned. Items with equal scores come out
/// in no particular order.
pub fn rank<T>(items: &[T], config: &RankConfig, limit: Option<usize>) -> Vec<ScoredItem<T>>
where
    T: Rated + Clone,
{
    let mut scored: Vec<ScoredItem<T>> = items
        .iter()
        .filter(|item| config.admits(*item))
        .filter_map(|item| {
            let v = item.vote_count()?;
            let r = item.vote_average()?;
            Some(ScoredItem {
                item: item.clone(),
                score: config.weighted_rating(v, r),
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(limit) = limit {
        scored.truncate(limit);
    }

    scored
}
