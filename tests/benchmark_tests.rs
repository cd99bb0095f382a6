//! Performance benchmarks for critical simulation systems

use server::engine::Engine;
use server::grid::GridMap;
use server::pathfinding::find_path;
use shared::{chunk_center, Coord, UnitEvent, UnitId};
use std::time::Instant;

/// Benchmarks pathfinding across a large open map
#[test]
fn benchmark_pathfinding_open_map() {
    let map = GridMap::open(128, 128);
    let src = Coord::from_units(0, 0);
    let dest = chunk_center(127, 127);

    let iterations = 100;
    let start = Instant::now();

    for _ in 0..iterations {
        let path = find_path(&map, src, dest).unwrap();
        assert_eq!(*path.last().unwrap(), dest);
    }

    let duration = start.elapsed();
    println!(
        "Open-map pathfinding (128x128): {} iterations in {:?} ({:.2} ms/iter)",
        iterations,
        duration,
        duration.as_millis() as f64 / iterations as f64
    );

    // Should complete 100 searches in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks pathfinding through a serpentine obstacle course, which
/// forces the search to expand most of the grid.
#[test]
fn benchmark_pathfinding_maze() {
    // Every other column is a wall with a single gap, alternating
    // between the top and bottom row.
    let size = 64;
    let mut rows = String::new();
    for y in 0..size {
        for x in 0..size {
            let wall = x % 2 == 1;
            let gap = if (x / 2) % 2 == 0 { size - 1 } else { 0 };
            rows.push(if wall && y != gap { '@' } else { '.' });
        }
        rows.push('\n');
    }
    let map = GridMap::from_rows(rows.trim_end());

    let src = Coord::from_units(0, 0);
    let dest = chunk_center(size as i32 - 1, 0);

    let iterations = 10;
    let start = Instant::now();

    for _ in 0..iterations {
        let path = find_path(&map, src, dest).unwrap();
        assert_eq!(*path.last().unwrap(), dest);
    }

    let duration = start.elapsed();
    println!(
        "Maze pathfinding (64x64): {} iterations in {:?} ({:.2} ms/iter)",
        iterations,
        duration,
        duration.as_millis() as f64 / iterations as f64
    );

    // Should complete 10 serpentine searches in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks ticking a world with many marching units
#[test]
fn benchmark_tick_with_many_units() {
    let mut engine = Engine::new(GridMap::open(32, 32));

    let unit_count = 200;
    for i in 0..unit_count {
        engine.issue_create_order(1, Coord::from_units(i % 32, i / 32));
    }
    engine.step().unwrap();

    let dest = chunk_center(31, 31);
    for i in 0..unit_count {
        engine
            .issue_move_order(UnitId::new(1, i as u32), dest)
            .unwrap();
    }

    let ticks = 100;
    let start = Instant::now();

    let mut total_events = 0;
    for _ in 0..ticks {
        total_events += engine.step().unwrap().len();
    }

    let duration = start.elapsed();
    println!(
        "Simulation tick: {} units x {} ticks ({} events) in {:?} ({:.2} us/tick)",
        unit_count,
        ticks,
        total_events,
        duration,
        duration.as_micros() as f64 / ticks as f64
    );

    // Should complete 100 ticks in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks serialization of a busy tick's event broadcast
#[test]
fn benchmark_event_packet_serialization() {
    use bincode::{deserialize, serialize};
    use shared::Packet;

    let events: Vec<UnitEvent> = (0..1000)
        .map(|i| UnitEvent::Moved {
            id: UnitId::new(i % 16, i / 16),
            pos: Coord::from_units(i as i32, (i * 3) as i32),
        })
        .collect();
    let packet = Packet::Events { tick: 12345, events };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&packet).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Event packet serialization: {} roundtrips in {:?} ({:.2} us/roundtrip)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should handle 10k roundtrips in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks serialization of a full-world handshake snapshot
#[test]
fn benchmark_snapshot_serialization() {
    use bincode::{deserialize, serialize};
    use shared::Packet;

    let mut engine = Engine::new(GridMap::open(128, 128));
    for i in 0..500 {
        engine.issue_create_order(i % 16, Coord::from_units(i as i32, i as i32));
    }
    engine.step().unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.terrain.len(), 128 * 128);

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&Packet::Snapshot(snapshot.clone())).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot serialization (128x128, 500 units): {} roundtrips in {:?} ({:.2} us/roundtrip)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should handle 1000 snapshot roundtrips in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Stress tests serial assignment with heavy unit churn
#[test]
fn stress_test_unit_churn() {
    let mut engine = Engine::new(GridMap::open(16, 16));

    let start = Instant::now();

    for round in 0..50 {
        for i in 0..20 {
            engine.issue_create_order(i, Coord::from_units(round, i as i32));
        }
        let created = engine.step().unwrap();
        assert_eq!(created.len(), 20);

        for event in created {
            if let UnitEvent::Created { id, .. } = event {
                engine.issue_delete_order(id);
            }
        }
        let deleted = engine.step().unwrap();
        assert_eq!(deleted.len(), 20);
    }
    assert!(engine.state().is_empty());

    let duration = start.elapsed();
    println!(
        "Unit churn: 50 rounds of 20 create/delete pairs in {:?}",
        duration
    );

    // Should complete 2000 create/delete pairs in under 1 second
    assert!(duration.as_millis() < 1000);
}
