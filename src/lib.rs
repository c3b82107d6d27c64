//! Star Trader core simulation.
//!
//! A 2D space-trading game: fly between planets, haul commodities, mine
//! asteroids, and deal with an NPC population of freighters, traders,
//! pirates, and patrols running a per-tick behavior state machine.

pub mod asteroid;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod mission;
pub mod motion;
pub mod npc;
pub mod pickup;
pub mod planet;
pub mod projectile;
pub mod save;
pub mod session;
pub mod ship;
pub mod trading;
