//! # Wolf Arena
//!
//! A deterministic engine for running Werewolf (Mafia) games between
//! autonomous agents, built for benchmarking agents against each other
//! in large reproducible batches.
//!
//! ## Architecture
//!
//! - [`core`]: seat ids, seeded RNG, and game configuration
//! - [`roles`]: the role capability table and legality queries
//! - [`engine`]: pure state and deterministic batch resolution
//! - [`agents`]: the async decision-maker contract and baselines
//! - [`moderator`]: solicitation with timeouts, retries, fallbacks
//! - [`session`]: single games and batches with derived seeds
//!
//! The layering is strict: the engine is synchronous and deterministic,
//! and only ever consumes complete batches of validated declarations.
//! Everything that can fail, stall, or misbehave (the agents) is
//! quarantined behind the moderator, which substitutes fallbacks and
//! records the fault rather than letting a bad agent corrupt or hang a
//! game.
//!
//! ## Determinism
//!
//! A game is a pure function of its configuration (including the seed)
//! and its agents' answers. All engine randomness is drawn from context
//! streams of the game seed over id-sorted candidates, so outcomes
//! never depend on seat order, hash iteration order, or reply timing.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wolf_arena::agents::{Agent, RandomAgent};
//! use wolf_arena::core::{GameConfig, GameRng};
//! use wolf_arena::session::GameRunner;
//!
//! # async fn demo() -> Result<(), wolf_arena::session::RunnerError> {
//! let config = GameConfig::classic(42);
//! let rng = GameRng::new(config.seed);
//! let agents: Vec<Arc<dyn Agent>> = (0..config.player_count)
//!     .map(|i| {
//!         Arc::new(RandomAgent::new(rng.for_context(&format!("agent:{i}"))))
//!             as Arc<dyn Agent>
//!     })
//!     .collect();
//!
//! let record = GameRunner::new(config, agents)?.run().await?;
//! println!("{}", record.verdict);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod core;
pub mod engine;
pub mod moderator;
pub mod roles;
pub mod session;

pub use crate::agents::{Agent, AgentError, RandomAgent, ScriptedAgent};
pub use crate::core::{ConfigError, FallbackPolicy, GameConfig, GameRng, PlayerId, TieBreakPolicy};
pub use crate::engine::{GameRecord, GameState, Phase, PlayerView, Verdict};
pub use crate::moderator::Moderator;
pub use crate::roles::{Faction, Role};
pub use crate::session::{BatchReport, BatchRunner, GameRunner, RunnerError};
