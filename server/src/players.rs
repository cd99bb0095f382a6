//! Connection tracking for joined players.
//!
//! The simulation core never sees addresses or timeouts; this module
//! owns the mapping between network addresses and player ids, enforces
//! the capacity limit, and sweeps out connections that have gone quiet.
//! Units owned by a departed player stay in the world until deleted.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// One joined player and their connection metadata.
#[derive(Debug)]
pub struct Player {
    pub id: u32,
    pub addr: SocketAddr,
    pub last_seen: Instant,
}

impl Player {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// True once nothing has been heard from this player within
    /// `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// All joined players, indexed by id, with a capacity limit.
pub struct PlayerManager {
    players: HashMap<u32, Player>,
    next_player_id: u32,
    max_players: usize,
}

impl PlayerManager {
    pub fn new(max_players: usize) -> Self {
        Self {
            players: HashMap::new(),
            next_player_id: 1,
            max_players,
        }
    }

    /// Registers a new player, returning `None` when the server is
    /// full. Player ids are never reused within a process lifetime.
    pub fn add_player(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.players.len() >= self.max_players {
            return None;
        }

        let player_id = self.next_player_id;
        self.next_player_id += 1;

        info!("Player {} connected from {}", player_id, addr);
        self.players.insert(player_id, Player::new(player_id, addr));
        Some(player_id)
    }

    /// Deregisters a player. Returns false if they were already gone.
    pub fn remove_player(&mut self, player_id: u32) -> bool {
        if let Some(player) = self.players.remove(&player_id) {
            info!("Player {} disconnected", player.id);
            true
        } else {
            false
        }
    }

    /// Looks up the player connected from `addr`.
    pub fn find_player_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.players
            .iter()
            .find(|(_, player)| player.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Marks the player as recently active.
    pub fn touch(&mut self, player_id: u32) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.last_seen = Instant::now();
        }
    }

    /// Removes every timed-out player and returns their ids.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .players
            .iter()
            .filter(|(_, player)| player.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for player_id in &timed_out {
            self.remove_player(*player_id);
        }

        timed_out
    }

    /// Every player id with its address, for broadcasting.
    pub fn addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.players
            .iter()
            .map(|(id, player)| (*id, player.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
