//! Selection policies over scored candidates.
//!
//! A [`Selector`] receives the live uid list, a per-uid score map (smaller
//! scores are stronger matches), and a requested count, and decides which
//! uids come back from a lookup. Two disciplines are provided:
//!
//! - [`RankedSelector`] — thresholded retrieval in ascending score order
//! - [`RouletteSelector`] — probabilistic sampling with replacement,
//!   weighted toward stronger matches
//!
//! plus [`DynamicSelector`], which switches between owned child selectors
//! at run time.

use std::cmp::Ordering;
use std::collections::HashMap;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MatchBinError, Result};
use crate::uid::Uid;

/// A rational configuration value.
///
/// A negative numerator encodes positive infinity; that is the convention
/// at every configuration boundary that accepts "no limit".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub num: i64,
    pub den: i64,
}

impl Ratio {
    /// Positive infinity under the negative-numerator convention.
    pub const INFINITE: Ratio = Ratio { num: -1, den: 1 };

    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Numeric value; any negative numerator reads as `f64::INFINITY`.
    pub fn value(self) -> f64 {
        if self.num < 0 {
            f64::INFINITY
        } else {
            self.num as f64 / self.den as f64
        }
    }
}

/// Policy choosing which candidate uids a lookup returns.
///
/// `scores` maps every uid in `uids` to its regulated score. Selectors may
/// reorder `uids` freely; the list's order is not a published container
/// invariant. Output ordering is defined per selector. A request for zero
/// results always yields an empty list.
pub trait Selector {
    fn select(&mut self, uids: &mut Vec<Uid>, scores: &HashMap<Uid, f64>, n: usize) -> Vec<Uid>;
}

/// Configuration for [`RankedSelector`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RankedConfig {
    /// Maximum score for a candidate to qualify at all.
    pub thresh: Ratio,
}

impl Default for RankedConfig {
    fn default() -> Self {
        Self {
            thresh: Ratio::INFINITE,
        }
    }
}

/// Returns up to `n` uids whose score meets the threshold, in ascending
/// score order. Ties break by current position in the uid list (stable).
#[derive(Clone, Debug)]
pub struct RankedSelector {
    thresh: f64,
}

impl RankedSelector {
    /// Selector with no threshold.
    pub fn new() -> Self {
        Self::with_config(RankedConfig::default())
    }

    pub fn with_config(config: RankedConfig) -> Self {
        Self {
            thresh: config.thresh.value(),
        }
    }
}

impl Default for RankedSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RankedSelector {
    fn select(&mut self, uids: &mut Vec<Uid>, scores: &HashMap<Uid, f64>, n: usize) -> Vec<Uid> {
        let mut back = 0;

        if (n as f64) < (uids.len() as f64).log2() {
            // Bounded selection sort: while the requested count stays under
            // log2 of the candidate count, n scans beat a full sort.
            while back < n {
                let mut min_index: Option<usize> = None;
                for j in back..uids.len() {
                    let score = scores[&uids[j]];
                    if score > self.thresh {
                        continue;
                    }
                    if min_index.map_or(true, |m| score < scores[&uids[m]]) {
                        min_index = Some(j);
                    }
                }
                let Some(m) = min_index else { break };
                uids.swap(back, m);
                back += 1;
            }
        } else {
            uids.sort_by(|a, b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));
            while back < uids.len() && back < n && scores[&uids[back]] <= self.thresh {
                back += 1;
            }
        }

        uids[..back].to_vec()
    }
}

/// Configuration for [`RouletteSelector`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RouletteConfig {
    /// Maximum score for a candidate to enter the sampling partition.
    pub thresh: Ratio,
    /// How sharply the strongest matches dominate; must be positive.
    /// Close to zero: near-deterministic; large: near-uniform.
    pub skew: Ratio,
    /// Upper bound on the baseline subtracted from partition scores.
    pub max_baseline: Ratio,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            thresh: Ratio::INFINITE,
            skew: Ratio::new(1, 10),
            // Without upregulation the best possible score is 1.0.
            max_baseline: Ratio::new(1, 1),
        }
    }
}

/// Samples exactly `n` uids with replacement from the sub-threshold
/// partition, weighting uid `u` by `1 / (skew + score(u) - baseline)`,
/// where `baseline = min(minimum score over all candidates, max_baseline)`.
///
/// Returns an empty list when no candidate meets the threshold.
#[derive(Clone, Debug)]
pub struct RouletteSelector<R: Rng = SmallRng> {
    thresh: f64,
    skew: f64,
    max_baseline: f64,
    rng: R,
}

impl<R: Rng> RouletteSelector<R> {
    /// Selector with the default configuration, drawing from `rng`.
    pub fn new(rng: R) -> Self {
        let config = RouletteConfig::default();
        Self {
            thresh: config.thresh.value(),
            skew: config.skew.value(),
            max_baseline: config.max_baseline.value(),
            rng,
        }
    }

    /// Validated constructor; rejects a non-positive skew.
    pub fn with_config(config: RouletteConfig, rng: R) -> Result<Self> {
        let skew = config.skew.value();
        if !(skew > 0.0) {
            return Err(MatchBinError::InvalidArgument(format!(
                "roulette skew must be positive, got {skew}"
            )));
        }
        Ok(Self {
            thresh: config.thresh.value(),
            skew,
            max_baseline: config.max_baseline.value(),
            rng,
        })
    }
}

impl<R: Rng> Selector for RouletteSelector<R> {
    fn select(&mut self, uids: &mut Vec<Uid>, scores: &HashMap<Uid, f64>, n: usize) -> Vec<Uid> {
        // Single pass: track the global minimum score while moving
        // qualifying uids into a prefix partition.
        let mut partition = 0;
        let mut min_score = f64::INFINITY;
        for i in 0..uids.len() {
            let score = scores[&uids[i]];
            debug_assert!(score >= 0.0);
            min_score = min_score.min(score);
            if score <= self.thresh {
                uids.swap(i, partition);
                partition += 1;
            }
        }

        if partition == 0 || n == 0 {
            return Vec::new();
        }

        // Anchor the weights at the strongest candidate no stronger than
        // max_baseline, so the best partition member weighs in at 1/skew.
        let baseline = min_score.min(self.max_baseline);
        debug_assert!(baseline >= 0.0);

        let weights = uids[..partition]
            .iter()
            .map(|uid| 1.0 / (self.skew + scores[uid] - baseline));
        let Ok(wheel) = WeightedIndex::new(weights) else {
            return Vec::new();
        };

        (0..n).map(|_| uids[wheel.sample(&mut self.rng)]).collect()
    }
}

/// Dispatches to one of an owned, ordered collection of child selectors.
///
/// The active child is chosen by a mode index switchable at run time;
/// switching to an index with no child is rejected.
pub struct DynamicSelector {
    children: Vec<Box<dyn Selector>>,
    mode: usize,
}

impl DynamicSelector {
    /// Dispatcher over `children`, starting at `mode`.
    pub fn new(children: Vec<Box<dyn Selector>>, mode: usize) -> Result<Self> {
        if mode >= children.len() {
            return Err(MatchBinError::InvalidArgument(format!(
                "mode {mode} out of range for {} child selectors",
                children.len()
            )));
        }
        Ok(Self { children, mode })
    }

    /// Appends a child selector.
    pub fn push(&mut self, child: Box<dyn Selector>) {
        self.children.push(child);
    }

    /// Index of the child currently receiving `select` calls.
    pub fn mode(&self) -> usize {
        self.mode
    }

    /// Switches dispatch to the child at `mode`.
    pub fn set_mode(&mut self, mode: usize) -> Result<()> {
        if mode >= self.children.len() {
            return Err(MatchBinError::InvalidArgument(format!(
                "mode {mode} out of range for {} child selectors",
                self.children.len()
            )));
        }
        self.mode = mode;
        Ok(())
    }
}

impl Selector for DynamicSelector {
    fn select(&mut self, uids: &mut Vec<Uid>, scores: &HashMap<Uid, f64>, n: usize) -> Vec<Uid> {
        self.children[self.mode].select(uids, scores, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_negative_numerator_reads_as_infinity() {
        assert_eq!(Ratio::new(-1, 1).value(), f64::INFINITY);
        assert_eq!(Ratio::INFINITE.value(), f64::INFINITY);
        assert_eq!(Ratio::new(1, 4).value(), 0.25);
        assert_eq!(Ratio::new(0, 1).value(), 0.0);
    }
}
