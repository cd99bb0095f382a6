//! Headless smoke-test client: connects, spawns a unit, marches it
//! around, deletes it, and prints every notification along the way.

use bincode::{deserialize, serialize};
use shared::{Coord, Packet, UnitEvent, UnitId};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};

async fn recv_packet(socket: &UdpSocket, buf: &mut [u8]) -> Result<Packet, Box<dyn std::error::Error>> {
    let (len, _) = timeout(Duration::from_secs(5), socket.recv_from(buf)).await??;
    Ok(deserialize::<Packet>(&buf[0..len])?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let server_addr = "127.0.0.1:8080".parse::<SocketAddr>()?;

    println!("Sending connection request to {}", server_addr);
    let connect = serialize(&Packet::Connect { client_version: 1 })?;
    socket.send_to(&connect, server_addr).await?;

    let mut buf = [0u8; 65536];

    let player_id = match recv_packet(&socket, &mut buf).await? {
        Packet::Connected { player_id } => {
            println!("Connected as player {}", player_id);
            player_id
        }
        other => {
            println!("Expected Connected but got: {:?}", other);
            return Ok(());
        }
    };

    match recv_packet(&socket, &mut buf).await? {
        Packet::Snapshot(snapshot) => {
            println!(
                "World snapshot: {}x{} chunks, {} units",
                snapshot.width,
                snapshot.height,
                snapshot.units.len()
            );
        }
        other => println!("Expected Snapshot but got: {:?}", other),
    }

    // Spawn a unit and wait for the server to confirm it.
    let spawn = Coord::from_units(10, 10);
    let create = serialize(&Packet::CreateUnit { spawn })?;
    socket.send_to(&create, server_addr).await?;

    let mut unit: Option<UnitId> = None;
    while unit.is_none() {
        if let Packet::Events { tick, events } = recv_packet(&socket, &mut buf).await? {
            for event in events {
                println!("Tick {}: {:?}", tick, event);
                if let UnitEvent::Created { id, .. } = event {
                    if id.player == player_id {
                        unit = Some(id);
                    }
                }
            }
        }
    }
    let unit = unit.expect("creation event observed");
    println!("Unit {} is live, ordering it across the map", unit);

    let dest = Coord::from_units(200, 150);
    let move_order = serialize(&Packet::MoveUnit { unit, dest })?;
    socket.send_to(&move_order, server_addr).await?;

    // Watch the march until the unit arrives (or events dry up).
    'watch: loop {
        match recv_packet(&socket, &mut buf).await {
            Ok(Packet::Events { tick, events }) => {
                for event in events {
                    println!("Tick {}: {:?}", tick, event);
                    if matches!(event, UnitEvent::Moved { id, pos } if id == unit && pos == dest) {
                        println!("Unit arrived at ({}, {})", dest.x, dest.y);
                        break 'watch;
                    }
                }
            }
            Ok(other) => println!("Unexpected packet: {:?}", other),
            Err(e) => {
                println!("Stopped watching: {}", e);
                break;
            }
        }
    }

    let delete = serialize(&Packet::DeleteUnit { unit })?;
    socket.send_to(&delete, server_addr).await?;

    if let Ok(Packet::Events { tick, events }) = recv_packet(&socket, &mut buf).await {
        for event in events {
            println!("Tick {}: {:?}", tick, event);
        }
    }

    println!("Sending disconnect");
    let disconnect = serialize(&Packet::Disconnect)?;
    socket.send_to(&disconnect, server_addr).await?;

    println!("Test client finished");
    Ok(())
}
