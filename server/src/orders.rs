//! Pending orders, buffered between ingestion and the tick.
//!
//! Each unit has one FIFO of orders; issuing new orders for a unit
//! replaces its queue wholesale, it never appends. Unit creations are
//! buffered separately because the unit (and thus its id) does not exist
//! until the tick engine applies the creation.

use shared::{Coord, Order, UnitId};
use std::collections::{HashMap, VecDeque};

/// Per-unit order queues plus the pending-creation list.
#[derive(Debug, Default)]
pub struct OrderQueue {
    queues: HashMap<UnitId, VecDeque<Order>>,
    pending_new_units: Vec<(u32, Coord)>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests creation of a unit for `player` at `spawn`. The unit
    /// becomes visible in the game state on the next tick.
    pub fn create_new_unit(&mut self, player: u32, spawn: Coord) {
        self.pending_new_units.push((player, spawn));
    }

    /// Returns and clears the pending-creation list, in issue order.
    pub fn drain_pending_new_units(&mut self) -> Vec<(u32, Coord)> {
        std::mem::take(&mut self.pending_new_units)
    }

    /// Replaces the unit's queue with `orders`. Previous orders for the
    /// unit are discarded, not merged.
    pub fn give_orders(&mut self, id: UnitId, orders: Vec<Order>) {
        self.queues.insert(id, orders.into());
    }

    /// True iff the unit has at least one pending order.
    pub fn has_next_order(&self, id: UnitId) -> bool {
        self.queues.get(&id).is_some_and(|q| !q.is_empty())
    }

    /// The unit's next order without consuming it.
    pub fn peek_next_order(&self, id: UnitId) -> Option<Order> {
        self.queues.get(&id).and_then(|q| q.front()).copied()
    }

    /// Consumes and returns the unit's next order, or `None` when the
    /// queue is empty.
    pub fn pop_next_order(&mut self, id: UnitId) -> Option<Order> {
        self.queues.get_mut(&id).and_then(VecDeque::pop_front)
    }

    /// Drops all queued orders for a unit, used when it is removed.
    pub fn forget(&mut self, id: UnitId) {
        self.queues.remove(&id);
    }
}
