//! The tag-addressed container.

use std::collections::HashMap;
use std::hash::Hash;

use log::{debug, trace};

use crate::error::{MatchBinError, Result};
use crate::metric::Metric;
use crate::selector::Selector;
use crate::uid::{Uid, UidAllocator};

/// An associative container mapping opaque tags to values, queried by tag
/// similarity rather than tag equality.
///
/// Every stored tag is compared against a lookup query with the container's
/// [`Metric`]; a [`Selector`] then chooses which candidates to return,
/// after per-entry regulators rescale each raw distance into an effective
/// score (`score = r * (distance + 1)`). Entries are addressed by stable
/// uids handed out at insertion, decoupling external references from
/// internal reordering. The same tag may be stored many times under
/// distinct uids.
///
/// # Example
///
/// ```
/// use matchbin::{BitTag, HammingMetric, MatchBin, RankedSelector};
///
/// let mut bin = MatchBin::new(HammingMetric::<8>, RankedSelector::new());
/// let a = bin.put("a", BitTag::new(0b0000_0000))?;
/// bin.put("b", BitTag::new(0b1111_0000))?;
///
/// let hits = bin.lookup(&BitTag::new(0b0000_0001), 1);
/// assert_eq!(hits, vec![a]);
/// # Ok::<(), matchbin::MatchBinError>(())
/// ```
pub struct MatchBin<V, M: Metric, S: Selector> {
    values: HashMap<Uid, V>,
    tags: HashMap<Uid, M::Tag>,
    regulators: HashMap<Uid, f64>,
    uids: Vec<Uid>,
    allocator: UidAllocator,
    metric: M,
    selector: S,
}

impl<V, M, S> MatchBin<V, M, S>
where
    M: Metric,
    M::Tag: Eq + Hash,
    S: Selector,
{
    /// Empty container using `metric` for distances and `selector` for
    /// choosing lookup results.
    pub fn new(metric: M, selector: S) -> Self {
        Self::with_uid_limit(metric, selector, usize::MAX)
    }

    /// Like [`new`](Self::new) but with uids restricted to `1..=max_uid`,
    /// which makes uid exhaustion observable at small sizes.
    pub fn with_uid_limit(metric: M, selector: S, max_uid: Uid) -> Self {
        Self {
            values: HashMap::new(),
            tags: HashMap::new(),
            regulators: HashMap::new(),
            uids: Vec::new(),
            allocator: UidAllocator::with_limit(max_uid),
            metric,
            selector,
        }
    }

    /// Stores `value` under `tag` and returns the new entry's uid. The
    /// entry starts with a neutral regulator of 1.0.
    ///
    /// Fails with [`MatchBinError::ContainerFull`] once every representable
    /// uid is live.
    pub fn put(&mut self, value: V, tag: M::Tag) -> Result<Uid> {
        let values = &self.values;
        let uid = self
            .allocator
            .allocate(|candidate| values.contains_key(&candidate))?;
        trace!("put entry under uid {uid}");
        self.values.insert(uid, value);
        self.tags.insert(uid, tag);
        self.regulators.insert(uid, 1.0);
        self.uids.push(uid);
        Ok(uid)
    }

    /// Removes the entry under `uid`. An unknown uid is a no-op: the post
    /// state simply does not contain it.
    pub fn delete(&mut self, uid: Uid) {
        self.values.remove(&uid);
        self.tags.remove(&uid);
        self.regulators.remove(&uid);
        self.uids.retain(|&u| u != uid);
    }

    /// Removes every entry. The uid counter is not reset; previously
    /// issued uids stay retired.
    pub fn clear(&mut self) {
        debug!("clearing {} entries", self.uids.len());
        self.values.clear();
        self.tags.clear();
        self.regulators.clear();
        self.uids.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Live uids, in insertion order minus deletions. Lookups may permute
    /// this order; it is not an invariant.
    pub fn uids(&self) -> &[Uid] {
        &self.uids
    }

    /// The stored value under `uid`.
    pub fn get_val(&self, uid: Uid) -> Result<&V> {
        self.values.get(&uid).ok_or(MatchBinError::UnknownUid(uid))
    }

    /// The stored tag under `uid`.
    pub fn get_tag(&self, uid: Uid) -> Result<&M::Tag> {
        self.tags.get(&uid).ok_or(MatchBinError::UnknownUid(uid))
    }

    /// Elementwise value lookup, preserving input order.
    pub fn get_vals(&self, uids: &[Uid]) -> Result<Vec<&V>> {
        uids.iter().map(|&uid| self.get_val(uid)).collect()
    }

    /// Elementwise tag lookup, preserving input order.
    pub fn get_tags(&self, uids: &[Uid]) -> Result<Vec<&M::Tag>> {
        uids.iter().map(|&uid| self.get_tag(uid)).collect()
    }

    /// Current regulator for `uid`.
    pub fn regulator(&self, uid: Uid) -> Result<f64> {
        self.regulators
            .get(&uid)
            .copied()
            .ok_or(MatchBinError::UnknownUid(uid))
    }

    /// Shifts the regulator for `uid` by `delta`, clamping at zero.
    /// Positive deltas downregulate the entry (weaker apparent match),
    /// negative deltas upregulate it.
    pub fn adj_regulator(&mut self, uid: Uid, delta: f64) -> Result<()> {
        let regulator = self
            .regulators
            .get_mut(&uid)
            .ok_or(MatchBinError::UnknownUid(uid))?;
        *regulator = (*regulator + delta).max(0.0);
        Ok(())
    }

    /// Sets the regulator for `uid`. Values below one upregulate, exactly
    /// one is neutral, values above one downregulate. Zero makes the entry
    /// score as a perfect match regardless of distance. Negative values
    /// are rejected.
    pub fn set_regulator(&mut self, uid: Uid, value: f64) -> Result<()> {
        if !(value >= 0.0) {
            return Err(MatchBinError::InvalidArgument(format!(
                "regulator must be non-negative, got {value}"
            )));
        }
        let regulator = self
            .regulators
            .get_mut(&uid)
            .ok_or(MatchBinError::UnknownUid(uid))?;
        *regulator = value;
        Ok(())
    }

    /// The configured metric.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The configured selector, mutably. Useful for switching a
    /// [`DynamicSelector`](crate::DynamicSelector) mode between lookups.
    pub fn selector_mut(&mut self) -> &mut S {
        &mut self.selector
    }

    /// Compares `query` against every stored tag and returns the uids the
    /// selector picks for a result count of `n`.
    ///
    /// Raw distances are computed once per distinct tag (metrics are
    /// assumed deterministic), rescaled per entry by its regulator, and
    /// handed to the selector together with the live uid list. An empty
    /// container or `n == 0` yields an empty result; `lookup` itself never
    /// fails.
    pub fn lookup(&mut self, query: &M::Query, n: usize) -> Vec<Uid> {
        let mut raw: HashMap<&M::Tag, f64> = HashMap::with_capacity(self.tags.len());
        for tag in self.tags.values() {
            raw.entry(tag)
                .or_insert_with(|| self.metric.distance(query, tag));
        }

        let mut scores: HashMap<Uid, f64> = HashMap::with_capacity(self.uids.len());
        for &uid in &self.uids {
            let distance = raw[&self.tags[&uid]];
            let regulator = self.regulators[&uid];
            scores.insert(uid, distance * regulator + regulator);
        }
        drop(raw);

        self.selector.select(&mut self.uids, &scores, n)
    }
}
