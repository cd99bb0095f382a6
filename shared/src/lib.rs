//! Types shared between the authoritative server and its clients.
//!
//! Everything both ends must agree on lives here: the hierarchical
//! coordinate model, unit identity, the order sum type, and the wire
//! packet/event values (serialized with bincode at the socket boundary).

pub mod coord;
pub mod protocol;

pub use coord::{chunk_center, Coord, Dist};
pub use protocol::{Order, Packet, UnitEvent, UnitId, WorldSnapshot};

/// Units per chunk along one axis. Chunks are the terrain and
/// pathfinding resolution.
pub const CHUNK_SIZE: i32 = 64;

/// Units per build cell along one axis (eight builds per chunk).
pub const BUILD_SIZE: i32 = 8;

/// Maximum distance a unit travels per tick, in unit coordinates.
pub const MAX_SPEED: f64 = 3.0;
