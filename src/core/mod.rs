//! Core types: player identity, deterministic RNG, configuration.
//!
//! These are the building blocks everything else is written against.
//! The engine treats a validated [`GameConfig`] as immutable for the
//! lifetime of a game.

pub mod config;
pub mod player;
pub mod rng;

pub use config::{ConfigError, FallbackPolicy, GameConfig, RoleCount, TieBreakPolicy};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
