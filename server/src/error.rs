//! Error types for the simulation core.

use shared::UnitId;
use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors produced by the simulation core.
///
/// `NotFound` and `NoPathToTarget` reject a single operation and never
/// take down the tick loop. `InternalInconsistency` means a core
/// invariant was violated; the tick aborts and the error propagates to
/// the supervisor.
#[derive(Debug, Error)]
pub enum SimError {
    /// Operation referenced a unit absent from the game state. A logic
    /// error upstream (stale or forged id); the caller logs and drops it.
    #[error("unit {0} not found")]
    NotFound(UnitId),

    /// Pathfinding found no route to the destination. An expected
    /// outcome of normal play; the move order is dropped silently.
    #[error("no path to target")]
    NoPathToTarget,

    /// A core invariant was violated. Fatal for the tick loop.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}
