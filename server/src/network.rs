//! Server network layer handling UDP communications and tick loop coordination.
//!
//! The simulation core stays transport-agnostic: this module decodes
//! datagrams into [`Packet`] values, feeds orders into the [`Engine`]
//! between ticks, and fans tick notifications out to every connected
//! client. Order ingestion and tick execution run interleaved on one
//! task, so a tick always sees a consistent snapshot of pending orders.

use crate::engine::Engine;
use crate::error::SimError;
use crate::grid::GridMap;
use crate::players::PlayerManager;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::Packet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// How long a player may stay silent before being dropped.
const PLAYER_TIMEOUT: Duration = Duration::from_secs(5);

/// Messages sent from network tasks to the main server loop.
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    PlayerTimeout {
        player_id: u32,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the tick loop to the network sender task.
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
    BroadcastPacket { packet: Packet },
}

/// Main server coordinating networking and the simulation tick.
pub struct Server {
    socket: Arc<UdpSocket>,
    players: Arc<RwLock<PlayerManager>>,
    engine: Engine,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_players: usize,
        map: GridMap,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            players: Arc::new(RwLock::new(PlayerManager::new(max_players))),
            engine: Engine::new(map),
            tick_duration,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    /// Spawns the task that continuously listens for incoming datagrams.
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 4096];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the outgoing packet queue.
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let players = Arc::clone(&self.players);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet } => {
                        let player_addrs = {
                            let players_guard = players.read().await;
                            players_guard.addrs()
                        };

                        for (player_id, addr) in player_addrs {
                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to player {}: {}", player_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns the task that sweeps out silent players.
    async fn spawn_timeout_checker(&self) {
        let players = Arc::clone(&self.players);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut players_guard = players.write().await;
                    players_guard.check_timeouts(PLAYER_TIMEOUT)
                };

                for player_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::PlayerTimeout { player_id }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket {
            packet: packet.clone(),
            addr,
        }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    async fn broadcast_packet(&self, packet: &Packet) {
        if let Err(e) = self.game_tx.send(GameMessage::BroadcastPacket {
            packet: packet.clone(),
        }) {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Processes one inbound packet against the simulation.
    ///
    /// Orders referencing unknown or foreign units are logged and
    /// dropped; only an internal-consistency failure propagates.
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) -> Result<(), SimError> {
        match packet {
            Packet::Connect { client_version } => {
                info!(
                    "Player connecting from {} (version: {})",
                    addr, client_version
                );

                // Replace an existing registration for this address.
                let existing = {
                    let players = self.players.read().await;
                    players.find_player_by_addr(addr)
                };
                if let Some(existing_id) = existing {
                    info!("Removing existing player {} from {}", existing_id, addr);
                    let mut players = self.players.write().await;
                    players.remove_player(existing_id);
                }

                let player_id = {
                    let mut players = self.players.write().await;
                    players.add_player(addr)
                };

                if let Some(player_id) = player_id {
                    self.send_packet(&Packet::Connected { player_id }, addr).await;
                    // Late joiners get the whole world up front instead
                    // of replaying history.
                    self.send_packet(&Packet::Snapshot(self.engine.snapshot()), addr)
                        .await;
                } else {
                    let response = Packet::Disconnected {
                        reason: "Server full".to_string(),
                    };
                    self.send_packet(&response, addr).await;
                }
            }

            Packet::CreateUnit { spawn } => {
                if let Some(player_id) = self.touch_player(addr).await {
                    self.engine.issue_create_order(player_id, spawn);
                }
            }

            Packet::MoveUnit { unit, dest } => {
                if let Some(player_id) = self.touch_player(addr).await {
                    if unit.player != player_id {
                        warn!(
                            "Player {} tried to move foreign unit {}",
                            player_id, unit
                        );
                        return Ok(());
                    }
                    match self.engine.issue_move_order(unit, dest) {
                        Ok(()) => {}
                        Err(SimError::NoPathToTarget) => {
                            debug!("No path for unit {} to ({}, {})", unit, dest.x, dest.y);
                        }
                        Err(SimError::NotFound(id)) => {
                            warn!("Move order for stale unit {}", id);
                        }
                        Err(err @ SimError::InternalInconsistency(_)) => return Err(err),
                    }
                }
            }

            Packet::DeleteUnit { unit } => {
                if let Some(player_id) = self.touch_player(addr).await {
                    if unit.player != player_id {
                        warn!(
                            "Player {} tried to delete foreign unit {}",
                            player_id, unit
                        );
                        return Ok(());
                    }
                    self.engine.issue_delete_order(unit);
                }
            }

            Packet::Disconnect => {
                let player_id = {
                    let players = self.players.read().await;
                    players.find_player_by_addr(addr)
                };
                if let Some(player_id) = player_id {
                    let mut players = self.players.write().await;
                    players.remove_player(player_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }

        Ok(())
    }

    /// Resolves the sender to a registered player and refreshes their
    /// activity timestamp. Packets from unknown addresses are dropped.
    async fn touch_player(&self, addr: SocketAddr) -> Option<u32> {
        let mut players = self.players.write().await;
        let player_id = players.find_player_by_addr(addr);
        match player_id {
            Some(id) => {
                players.touch(id);
                Some(id)
            }
            None => {
                warn!("Ignoring order from unregistered address {}", addr);
                None
            }
        }
    }

    /// Main server loop coordinating ingestion and the fixed tick.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;

        let mut tick_interval = interval(self.tick_duration);

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await?;
                        },
                        Some(ServerMessage::PlayerTimeout { player_id }) => {
                            info!("Player {} timed out", player_id);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Advance the simulation one tick and broadcast deltas.
                _ = tick_interval.tick() => {
                    let events = self.engine.step()?;

                    if !events.is_empty() {
                        let packet = Packet::Events {
                            tick: self.engine.tick(),
                            events,
                        };
                        self.broadcast_packet(&packet).await;
                    }

                    if self.engine.tick() % 100 == 0 {
                        let player_count = {
                            let players = self.players.read().await;
                            players.len()
                        };
                        if player_count > 0 {
                            debug!(
                                "Tick {}: {} players, {} units",
                                self.engine.tick(),
                                player_count,
                                self.engine.state().len()
                            );
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Coord, UnitId};
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_server_message_creation() {
        let packet = Packet::Connect { client_version: 1 };
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);

        let msg = ServerMessage::PacketReceived {
            packet: packet.clone(),
            addr,
        };

        match msg {
            ServerMessage::PacketReceived { packet: p, addr: a } => {
                assert_eq!(a, addr);
                match p {
                    Packet::Connect { client_version } => assert_eq!(client_version, 1),
                    _ => panic!("Unexpected packet type"),
                }
            }
            _ => panic!("Unexpected message type"),
        }
    }

    #[test]
    fn test_game_message_broadcast() {
        let packet = Packet::Events {
            tick: 100,
            events: vec![],
        };

        let msg = GameMessage::BroadcastPacket {
            packet: packet.clone(),
        };

        match msg {
            GameMessage::BroadcastPacket { packet: p } => match p {
                Packet::Events { tick, .. } => assert_eq!(tick, 100),
                _ => panic!("Unexpected packet type"),
            },
            _ => panic!("Unexpected message type"),
        }
    }

    #[test]
    fn test_channel_communication() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        let msg = ServerMessage::PacketReceived {
            packet: Packet::MoveUnit {
                unit: UnitId::new(1, 0),
                dest: Coord::from_units(5, 5),
            },
            addr,
        };

        assert!(tx.send(msg).is_ok());

        match rx.try_recv().unwrap() {
            ServerMessage::PacketReceived { packet, addr: a } => {
                assert_eq!(a, addr);
                match packet {
                    Packet::MoveUnit { unit, dest } => {
                        assert_eq!(unit, UnitId::new(1, 0));
                        assert_eq!(dest, Coord::from_units(5, 5));
                    }
                    _ => panic!("Unexpected packet type"),
                }
            }
            _ => panic!("Unexpected message type"),
        }
    }

    #[tokio::test]
    async fn test_server_binds_and_starts_empty() {
        let server = Server::new(
            "127.0.0.1:0",
            Duration::from_millis(100),
            8,
            GridMap::open(4, 4),
        )
        .await
        .unwrap();

        assert!(server.engine.state().is_empty());
        assert_eq!(server.engine.tick(), 0);
        assert!(server.players.read().await.is_empty());
    }
}
