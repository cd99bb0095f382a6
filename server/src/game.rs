//! Authoritative game state: which units exist and where they are.
//!
//! Positions are always integer unit coordinates. Every mutation goes
//! through the tick engine, which owns the single [`GameState`] instance
//! for the lifetime of the server process.

use crate::error::{Result, SimError};
use crate::grid::GridMap;
use log::info;
use shared::{Coord, UnitId, MAX_SPEED};
use std::collections::HashMap;

/// The authoritative unit-to-position mapping plus the static terrain.
#[derive(Debug)]
pub struct GameState {
    units: HashMap<UnitId, Coord>,
    map: GridMap,
}

impl GameState {
    pub fn new(map: GridMap) -> Self {
        Self {
            units: HashMap::new(),
            map,
        }
    }

    /// The static terrain grid.
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Creates a unit for `player` at `pos` and returns its id.
    ///
    /// The serial is one past the highest serial the player currently
    /// holds, so serials are reused once their holder is removed.
    pub fn add_unit(&mut self, player: u32, pos: Coord) -> UnitId {
        let sub = self
            .units
            .keys()
            .filter(|id| id.player == player)
            .map(|id| id.sub)
            .max()
            .map_or(0, |highest| highest + 1);

        let id = UnitId::new(player, sub);
        info!("Added unit {} at ({}, {})", id, pos.x, pos.y);
        self.units.insert(id, pos);
        id
    }

    /// Removes a unit, failing with `NotFound` if it does not exist.
    pub fn remove_unit(&mut self, id: UnitId) -> Result<()> {
        if self.units.remove(&id).is_none() {
            return Err(SimError::NotFound(id));
        }
        info!("Removed unit {}", id);
        Ok(())
    }

    /// Current position of a unit.
    pub fn position(&self, id: UnitId) -> Result<Coord> {
        self.units
            .get(&id)
            .copied()
            .ok_or(SimError::NotFound(id))
    }

    /// Non-failing existence check for callers that branch instead of
    /// handling an error.
    pub fn is_valid(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Moves a unit one tick's worth of distance straight toward `dest`
    /// and returns the new position.
    ///
    /// Within [`MAX_SPEED`] of the destination the unit snaps exactly
    /// onto it; otherwise it advances `MAX_SPEED` along the straight
    /// line, with the result rounded to integer coordinates. The unit
    /// never overshoots.
    pub fn move_unit_toward(&mut self, id: UnitId, dest: Coord) -> Result<Coord> {
        let pos = self.position(id)?;
        let delta = dest - pos;
        let distance = delta.length();

        let next = if distance <= MAX_SPEED {
            dest
        } else {
            // distance > MAX_SPEED > 0 here, so the division is safe.
            pos + delta * (MAX_SPEED / distance)
        };

        self.units.insert(id, next);
        Ok(next)
    }

    /// Ids of every live unit, in unspecified order.
    pub fn live_ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    /// Every live unit with its position, for the handshake snapshot.
    pub fn units(&self) -> impl Iterator<Item = (UnitId, Coord)> + '_ {
        self.units.iter().map(|(id, pos)| (*id, *pos))
    }

    /// Number of live units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when no units exist.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(GridMap::open(5, 5))
    }

    #[test]
    fn test_add_unit_assigns_sequential_serials() {
        let mut state = state();

        let first = state.add_unit(7, Coord::from_units(0, 0));
        let second = state.add_unit(7, Coord::from_units(1, 1));
        let other_player = state.add_unit(3, Coord::from_units(2, 2));

        assert_eq!(first, UnitId::new(7, 0));
        assert_eq!(second, UnitId::new(7, 1));
        assert_eq!(other_player, UnitId::new(3, 0));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_serial_reuse_after_removal() {
        let mut state = state();

        let id = state.add_unit(1, Coord::from_units(0, 0));
        assert_eq!(id.sub, 0);
        state.remove_unit(id).unwrap();

        // The serial comes back only once the prior holder is fully gone.
        let reused = state.add_unit(1, Coord::from_units(5, 5));
        assert_eq!(reused, UnitId::new(1, 0));
    }

    #[test]
    fn test_serial_not_reused_while_holder_lives() {
        let mut state = state();

        let first = state.add_unit(1, Coord::from_units(0, 0));
        let second = state.add_unit(1, Coord::from_units(1, 0));
        state.remove_unit(first).unwrap();

        // Serial 1 is still held, so the next assignment is 2, not 0.
        let third = state.add_unit(1, Coord::from_units(2, 0));
        assert_eq!(second, UnitId::new(1, 1));
        assert_eq!(third, UnitId::new(1, 2));
    }

    #[test]
    fn test_unknown_id_operations_fail_with_not_found() {
        let mut state = state();
        let ghost = UnitId::new(9, 9);

        assert!(!state.is_valid(ghost));
        assert!(matches!(state.position(ghost), Err(SimError::NotFound(_))));
        assert!(matches!(
            state.remove_unit(ghost),
            Err(SimError::NotFound(_))
        ));
        assert!(matches!(
            state.move_unit_toward(ghost, Coord::from_units(0, 0)),
            Err(SimError::NotFound(_))
        ));
    }

    #[test]
    fn test_move_within_max_speed_snaps_to_dest() {
        let mut state = state();
        let id = state.add_unit(1, Coord::from_units(0, 0));

        let dest = Coord::from_units(2, 2); // distance sqrt(8) < 3
        let next = state.move_unit_toward(id, dest).unwrap();
        assert_eq!(next, dest);
        assert_eq!(state.position(id).unwrap(), dest);
    }

    #[test]
    fn test_move_beyond_max_speed_is_capped() {
        let mut state = state();
        let id = state.add_unit(1, Coord::from_units(0, 0));

        let dest = Coord::from_units(9, 0);
        assert_eq!(
            state.move_unit_toward(id, dest).unwrap(),
            Coord::from_units(3, 0)
        );
        assert_eq!(
            state.move_unit_toward(id, dest).unwrap(),
            Coord::from_units(6, 0)
        );
        assert_eq!(state.move_unit_toward(id, dest).unwrap(), dest);
    }

    #[test]
    fn test_move_never_overshoots() {
        let mut state = state();
        let id = state.add_unit(1, Coord::from_units(0, 0));
        let dest = Coord::from_units(10, 7);

        let total = (dest - Coord::from_units(0, 0)).length();
        let max_ticks = (total / MAX_SPEED).ceil() as usize;

        let mut remaining = total;
        let mut arrived = false;
        for tick in 1..=max_ticks {
            let pos = state.move_unit_toward(id, dest).unwrap();
            let now_remaining = (dest - pos).length();
            assert!(
                now_remaining < remaining,
                "no progress toward dest at tick {tick}"
            );
            remaining = now_remaining;
            if pos == dest {
                arrived = true;
                break;
            }
        }
        assert!(arrived, "unit should arrive within ceil(d / MAX_SPEED) ticks");
        assert_eq!(state.position(id).unwrap(), dest);
    }
}
