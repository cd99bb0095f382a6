//! # Authoritative RTS Server Library
//!
//! This library implements the authoritative server for a small
//! real-time-strategy game. Clients connect over UDP, issue unit
//! creation, movement, and deletion orders, and the server advances a
//! shared simulation on a fixed tick, broadcasting state deltas to all
//! connected clients.
//!
//! ## Architecture
//!
//! The simulation core is transport-agnostic and has one mutation path:
//!
//! - [`grid`] — the static chunk passability grid, fixed at startup.
//! - [`pathfinding`] — deterministic A* over chunks, run at order-issue
//!   time; its waypoints become ordinary move orders.
//! - [`game`] — the authoritative unit/position mapping with integer
//!   coordinate invariants.
//! - [`orders`] — per-unit order queues plus the pending-creation list,
//!   buffering inbound orders between ticks.
//! - [`engine`] — the tick driver: drains creations, advances each
//!   unit's queue by at most one transition, and emits notifications.
//!
//! Around the core sit the boundary collaborators:
//!
//! - [`players`] — connection registry, capacity limit, timeout sweep.
//! - [`network`] — UDP socket tasks and the `select!` loop that
//!   interleaves order ingestion with the fixed-period tick, so each
//!   tick sees a consistent snapshot of pending orders.
//!
//! Errors are typed ([`error::SimError`]): stale ids and unreachable
//! destinations reject single operations, while an internal
//! inconsistency aborts the tick loop and propagates to the supervisor.

pub mod engine;
pub mod error;
pub mod game;
pub mod grid;
pub mod orders;
pub mod pathfinding;
pub mod players;
pub mod network;
