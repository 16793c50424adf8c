//! Similarity metrics over tags.
//!
//! A [`Metric`] maps a query and a stored tag to a non-negative distance,
//! with 0 meaning exact match. Neither symmetry nor the triangle inequality
//! is assumed; [`NextUpMetric`] is asymmetric on purpose.

use crate::tag::BitTag;

/// Distance between a query and a stored tag. Smaller is closer.
pub trait Metric {
    /// Query type compared against stored tags.
    type Query;
    /// Stored tag type.
    type Tag;

    /// Non-negative distance; `0.0` is an exact match.
    fn distance(&self, query: &Self::Query, tag: &Self::Tag) -> f64;
}

/// Number of differing bits between two width-`W` bit strings.
///
/// Output range is `0..=W`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HammingMetric<const W: usize>;

impl<const W: usize> Metric for HammingMetric<W> {
    type Query = BitTag<W>;
    type Tag = BitTag<W>;

    fn distance(&self, query: &Self::Query, tag: &Self::Tag) -> f64 {
        f64::from(query.xor(*tag).count_ones())
    }
}

/// Absolute difference between two signed integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbsDiffMetric;

impl Metric for AbsDiffMetric {
    type Query = i64;
    type Tag = i64;

    fn distance(&self, query: &Self::Query, tag: &Self::Tag) -> f64 {
        query.abs_diff(*tag) as f64
    }
}

/// Forward modular distance from the query up to the tag, wrapping at
/// `max`.
///
/// Tags and queries live in `0..=max`. A tag just above the query is
/// distance 1; a tag just below is distance `max`; an equal tag is
/// distance 0.
///
/// Adapted from the tag-matching scheme of Spector et al., "Tag-based
/// modules in genetic programming", GECCO 2011.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextUpMetric {
    max: usize,
}

impl NextUpMetric {
    /// Metric over tags and queries in `0..=max`.
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Default for NextUpMetric {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metric for NextUpMetric {
    type Query = usize;
    type Tag = usize;

    fn distance(&self, query: &Self::Query, tag: &Self::Tag) -> f64 {
        let (q, t) = (*query, *tag);
        let wrapped = if t >= q { t - q } else { self.max - (q - t) + 1 };
        wrapped as f64
    }
}

/// Streak distance between two width-`W` bit strings.
///
/// Weighs the longest matching run against the longest mismatching run of
/// the XOR, each by its a-priori probability `p(k) = (W - k + 1) / 2^k`
/// under a uniform model, so runs of different lengths stay comparable.
/// Output is in the open interval (0, 1).
///
/// Adapted from Downing, "Intelligence Emerging: Adaptivity and Search in
/// Evolving Neural Systems", MIT Press 2015.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreakMetric<const W: usize>;

impl<const W: usize> StreakMetric<W> {
    fn streak_probability(k: usize) -> f64 {
        (W as f64 - k as f64 + 1.0) / 2f64.powi(k as i32)
    }
}

impl<const W: usize> Metric for StreakMetric<W> {
    type Query = BitTag<W>;
    type Tag = BitTag<W>;

    fn distance(&self, query: &Self::Query, tag: &Self::Tag) -> f64 {
        let mismatch = query.xor(*tag);
        let same = mismatch.longest_zeros_run();
        let different = mismatch.longest_ones_run();
        let p_same = Self::streak_probability(same);
        let p_different = Self::streak_probability(different);
        // p_different / (p_same + p_different) is a match score in (0, 1);
        // subtract from 1 so that smaller still means closer.
        1.0 - p_different / (p_same + p_different)
    }
}

/// Absolute difference between the unsigned-integer readings of two
/// width-`W` bit strings.
///
/// Only defined for widths up to 32 bits; construction rejects anything
/// wider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbsIntDiffMetric<const W: usize>;

impl<const W: usize> AbsIntDiffMetric<W> {
    pub fn new() -> Self {
        assert!(W <= 32, "AbsIntDiffMetric is only defined for widths up to 32");
        Self
    }
}

impl<const W: usize> Default for AbsIntDiffMetric<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize> Metric for AbsIntDiffMetric<W> {
    type Query = BitTag<W>;
    type Tag = BitTag<W>;

    fn distance(&self, query: &Self::Query, tag: &Self::Tag) -> f64 {
        query.bits().abs_diff(tag.bits()) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hamming_counts_differing_bits() {
        let m = HammingMetric::<8>;
        let zero = BitTag::new(0);
        assert_eq!(m.distance(&zero, &zero), 0.0);
        assert_eq!(m.distance(&zero, &BitTag::new(0b0000_0111)), 3.0);
        assert_eq!(m.distance(&zero, &BitTag::new(0xFF)), 8.0);
    }

    #[test]
    fn next_up_distance_wraps_forward() {
        let m = NextUpMetric::new(99);
        assert_eq!(m.distance(&15, &20), 5.0);
        assert_eq!(m.distance(&15, &30), 15.0);
        assert_eq!(m.distance(&15, &10), 95.0);
        assert_eq!(m.distance(&7, &7), 0.0);
        assert_eq!(m.distance(&5, &6), 1.0);
        assert_eq!(m.distance(&6, &5), 99.0);
    }

    #[test]
    fn streak_grows_with_mismatch_runs() {
        let m = StreakMetric::<8>;
        let zero = BitTag::new(0);
        let d_exact = m.distance(&zero, &zero);
        let d_one = m.distance(&zero, &BitTag::new(0b0000_0001));
        let d_four = m.distance(&zero, &BitTag::new(0b0000_1111));
        let d_all = m.distance(&zero, &BitTag::new(0b1111_1111));
        assert!(
            d_exact < d_one && d_one < d_four && d_four < d_all,
            "distances should grow with the mismatching run: {d_exact} {d_one} {d_four} {d_all}"
        );
        for d in [d_exact, d_one, d_four, d_all] {
            assert!(d > 0.0 && d < 1.0, "streak distance {d} out of (0, 1)");
        }
    }

    #[test]
    fn abs_int_diff_reads_bits_as_integers() {
        let m = AbsIntDiffMetric::<8>::new();
        assert_eq!(m.distance(&BitTag::new(200), &BitTag::new(56)), 144.0);
        assert_eq!(m.distance(&BitTag::new(56), &BitTag::new(200)), 144.0);
    }

    #[test]
    #[should_panic]
    fn abs_int_diff_rejects_wide_tags() {
        let _ = AbsIntDiffMetric::<33>::new();
    }

    #[test]
    fn abs_diff_is_symmetric_magnitude() {
        assert_eq!(AbsDiffMetric.distance(&-3, &4), 7.0);
        assert_eq!(AbsDiffMetric.distance(&4, &-3), 7.0);
        assert_eq!(AbsDiffMetric.distance(&9, &9), 0.0);
    }
}
