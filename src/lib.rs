//! # matchbin
//!
//! Tag-addressed associative lookup.
//!
//! `matchbin` maps opaque tags to values and retrieves entries by tag
//! *similarity* instead of equality. A query is scored against every stored
//! tag with a pluggable distance [`Metric`]; a pluggable [`Selector`]
//! decides which candidates come back; per-entry regulators amplify or
//! attenuate apparent match strength without touching tags or values.
//!
//! Components:
//!
//! - [`MatchBin`] — the container: stable-uid entry management plus
//!   similarity lookup
//! - [`metric`] — Hamming, streak, modular next-up, and absolute-difference
//!   distances
//! - [`selector`] — ranked thresholded retrieval, roulette sampling, and
//!   run-time mode switching
//! - [`tag`] — fixed-width bit-string tags shared by the bit-oriented
//!   metrics

pub mod container;
pub mod error;
pub mod metric;
pub mod selector;
pub mod tag;
pub mod uid;

pub use container::MatchBin;
pub use error::{MatchBinError, Result};
pub use metric::{
    AbsDiffMetric, AbsIntDiffMetric, HammingMetric, Metric, NextUpMetric, StreakMetric,
};
pub use selector::{
    DynamicSelector, RankedConfig, RankedSelector, Ratio, RouletteConfig, RouletteSelector,
    Selector,
};
pub use tag::BitTag;
pub use uid::Uid;
