//! Error types for container and selector operations.

use crate::uid::Uid;

/// Errors surfaced by [`MatchBin`](crate::MatchBin) operations and by
/// selector construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchBinError {
    /// Every representable uid is already in use.
    #[error("container full: no unused uid available")]
    ContainerFull,

    /// The referenced uid is not a live entry.
    #[error("unknown uid: {0}")]
    UnknownUid(Uid),

    /// A configuration or argument value is outside its documented domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for matchbin operations.
pub type Result<T> = std::result::Result<T, MatchBinError>;
