use thiserror::Error;

use crate::graph::nodes::StationId;
use crate::time::Time;

/// Rejections of a malformed or unanswerable query, reported before any
/// search work is done.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadRequest {
    #[error("query has no origin terminal")]
    EmptyOrigins,
    #[error("query has no destination terminal")]
    EmptyDestinations,
    #[error("invalid search window [{begin}, {end}]")]
    InvalidWindow { begin: Time, end: Time },
    #[error("unknown station {station:?}")]
    UnknownStation { station: StationId },
    #[error("too many start labels in window [{begin}, {end}]")]
    TooManyStartLabels { begin: Time, end: Time },
}

/// Invariant violations inside the engine. These indicate a bug, not a
/// bad query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("label chain does not reach back to a start label")]
    BrokenLabelChain,
    #[error("route edge produced a label without a connection")]
    MissingConnection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    BadRequest(#[from] BadRequest),
    #[error(transparent)]
    Internal(#[from] InternalError),
}
