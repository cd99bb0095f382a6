//! The tick engine: the single authoritative mutation path.
//!
//! Inbound orders are buffered in the [`OrderQueue`]; once per fixed
//! tick [`Engine::step`] drains pending creations, advances every unit's
//! queue by at most one real transition, and returns the notifications
//! to broadcast. Pathfinding runs at order-issue time, off the tick's
//! critical path, and its waypoints are enqueued as ordinary move
//! orders.

use crate::error::{Result, SimError};
use crate::game::GameState;
use crate::grid::GridMap;
use crate::orders::OrderQueue;
use crate::pathfinding;
use log::{debug, warn};
use shared::{Coord, Order, UnitEvent, UnitId, WorldSnapshot};

/// Owns the game state and order queue; drives the simulation.
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    orders: OrderQueue,
    tick: u64,
}

impl Engine {
    pub fn new(map: GridMap) -> Self {
        Self {
            state: GameState::new(map),
            orders: OrderQueue::new(),
            tick: 0,
        }
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Read access to the authoritative state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Queues a unit creation. The unit is added to the game state, and
    /// its id assigned, when the next tick runs.
    pub fn issue_create_order(&mut self, player: u32, spawn: Coord) {
        self.orders.create_new_unit(player, spawn);
    }

    /// Computes a path from the unit's current position to `dest` and
    /// replaces the unit's queue with the resulting waypoint orders.
    ///
    /// # Errors
    ///
    /// `NotFound` if the unit does not exist, `NoPathToTarget` if no
    /// route exists; both reject only this order.
    pub fn issue_move_order(&mut self, unit: UnitId, dest: Coord) -> Result<()> {
        let pos = self.state.position(unit)?;
        let waypoints = pathfinding::find_path(self.state.map(), pos, dest)?;
        self.orders
            .give_orders(unit, waypoints.into_iter().map(Order::MoveTo).collect());
        Ok(())
    }

    /// Replaces the unit's queue with a single delete order. Orders for
    /// ids that are not live are dropped here; the tick itself guards
    /// again in case the unit disappears before the order is applied.
    pub fn issue_delete_order(&mut self, unit: UnitId) {
        if self.state.is_valid(unit) {
            self.orders.give_orders(unit, vec![Order::Delete]);
        } else {
            debug!("Dropping delete order for unknown unit {}", unit);
        }
    }

    /// Full world view for synchronizing a newly joined client.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut units: Vec<(UnitId, Coord)> = self.state.units().collect();
        units.sort_by_key(|(id, _)| *id);
        WorldSnapshot {
            width: self.state.map().width(),
            height: self.state.map().height(),
            terrain: self.state.map().terrain().to_vec(),
            units,
        }
    }

    /// Runs one simulation tick and returns the notifications to
    /// broadcast, in generation order.
    ///
    /// An error for one unit is logged and skipped so it cannot stall
    /// the rest of the tick; only [`SimError::InternalInconsistency`]
    /// aborts, since it means the core state can no longer be trusted.
    pub fn step(&mut self) -> Result<Vec<UnitEvent>> {
        self.tick += 1;
        let mut events = Vec::new();

        // Step 1: apply pending creations in issue order.
        for (player, spawn) in self.orders.drain_pending_new_units() {
            let id = self.state.add_unit(player, spawn);
            events.push(UnitEvent::Created { id, pos: spawn });
        }

        // Step 2: advance each unit's queue by at most one transition.
        // The id set is snapshotted (and sorted for determinism) before
        // any queue is touched; freshly created units have empty queues,
        // so they first act on the tick after their creation.
        let mut ids = self.state.live_ids();
        ids.sort();

        for id in ids {
            if let Err(err) = self.step_unit(id, &mut events) {
                match err {
                    SimError::InternalInconsistency(_) => return Err(err),
                    other => warn!("Order processing failed for unit {}: {}", id, other),
                }
            }
        }

        Ok(events)
    }

    /// Advances one unit: consumes already-satisfied waypoints, then
    /// performs at most one real move or delete.
    fn step_unit(&mut self, id: UnitId, events: &mut Vec<UnitEvent>) -> Result<()> {
        loop {
            let Some(order) = self.orders.peek_next_order(id) else {
                return Ok(());
            };

            match order {
                Order::Delete => {
                    self.orders.forget(id);
                    // A delete may reference a unit that no longer exists
                    // (or never did); skip the removal and the broadcast.
                    if self.state.is_valid(id) {
                        self.state.remove_unit(id)?;
                        events.push(UnitEvent::Deleted { id });
                    }
                    return Ok(());
                }
                Order::MoveTo(dest) => {
                    let pos = self.state.position(id)?;
                    if pos == dest {
                        // Waypoint already satisfied: consume it and keep
                        // scanning, no movement happened yet.
                        self.orders.pop_next_order(id);
                        continue;
                    }

                    let next = self.state.move_unit_toward(id, dest)?;
                    if next == dest {
                        self.orders.pop_next_order(id);
                    }
                    events.push(UnitEvent::Moved { id, pos: next });
                    // One real move per tick.
                    return Ok(());
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn orders_mut(&mut self) -> &mut OrderQueue {
        &mut self.orders
    }
}
