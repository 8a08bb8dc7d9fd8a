//! The deterministic game engine: state, batches, and resolution.
//!
//! The engine is pure and synchronous. It knows nothing about agents or
//! timeouts; it consumes complete batches of declarations and mutates
//! `GameState` deterministically. Everything asynchronous lives in the
//! moderator layer above.

pub mod action;
pub mod outcome;
pub mod phase;
pub mod resolver;
pub mod state;
pub mod victory;

use thiserror::Error;

use crate::core::PlayerId;

pub use action::{DeclaredAction, NightBatch, Vote, VoteBatch};
pub use outcome::{
    AgentFault, Channel, FallbackApplied, FaultKind, GameRecord, Inspection, NightOutcome,
    RosterEntry, RoundRecord, Speech, Verdict, VoteOutcome,
};
pub use phase::Phase;
pub use resolver::{Resolver, VoteResolution};
pub use state::{GameState, Player, PlayerView, SeatInfo};
pub use victory::check_victory;

/// Errors from batch admission and resolution.
///
/// All of these indicate a bug in the layer feeding the engine, never a
/// misbehaving agent: agent faults are substituted away by the
/// moderator before a batch is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A batch was submitted without a declaration from every eligible
    /// actor.
    #[error("round {round} batch is missing a declaration from {missing}")]
    IncompleteBatch { round: u32, missing: PlayerId },

    /// An actor declared twice in the same batch.
    #[error("round {round}: duplicate declaration from {actor}")]
    DuplicateDeclaration { round: u32, actor: PlayerId },

    /// A declaration came from a dead player or one without the
    /// claimed capability.
    #[error("round {round}: {actor} is not eligible to act")]
    IneligibleActor { round: u32, actor: PlayerId },

    /// A declaration targeted outside its legal target set.
    #[error("{actor} declared an illegal target {target}")]
    IllegalTarget { actor: PlayerId, target: PlayerId },

    /// A declaration or batch was stamped with the wrong round.
    #[error("batch is for round {batch_round} but the game is in round {round}")]
    RoundMismatch { batch_round: u32, round: u32 },
}
