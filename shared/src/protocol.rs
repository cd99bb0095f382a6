//! Wire-level values exchanged between clients and the server.
//!
//! The simulation core produces and consumes these as plain values; the
//! network layer is the only place that bincodes them onto a socket.

use crate::coord::Coord;
use serde::{Deserialize, Serialize};

/// Identity of one unit: the owning player plus a per-player serial.
///
/// Serials are assigned sequentially as one past the highest serial the
/// player currently holds, which means a serial is reused once the unit
/// holding it is removed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId {
    pub player: u32,
    pub sub: u32,
}

impl UnitId {
    pub const fn new(player: u32, sub: u32) -> Self {
        Self { player, sub }
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.player, self.sub)
    }
}

/// One pending instruction in a unit's queue, consumed by the tick engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Travel in a straight line toward the waypoint.
    MoveTo(Coord),
    /// Remove the unit; always terminates the queue.
    Delete,
}

/// State-change notification broadcast to every connected client after a
/// tick. Emission order within a tick is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEvent {
    Created { id: UnitId, pos: Coord },
    Moved { id: UnitId, pos: Coord },
    Deleted { id: UnitId },
}

/// Full read-only view of the world, sent once to a newly connected
/// client so it can synchronize without replaying history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Map width in chunks.
    pub width: u32,
    /// Map height in chunks.
    pub height: u32,
    /// Terrain codes in row-major order (0 = passable, 1 = impassable).
    pub terrain: Vec<u8>,
    /// Every currently-live unit and its position.
    pub units: Vec<(UnitId, Coord)>,
}

/// All packets on the wire, client-to-server first, then server-to-client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    CreateUnit {
        spawn: Coord,
    },
    MoveUnit {
        unit: UnitId,
        dest: Coord,
    },
    DeleteUnit {
        unit: UnitId,
    },
    Disconnect,

    Connected {
        player_id: u32,
    },
    Snapshot(WorldSnapshot),
    Events {
        tick: u64,
        events: Vec<UnitEvent>,
    },
    Disconnected {
        reason: String,
    },
}
