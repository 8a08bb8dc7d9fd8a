//! The agent contract.
//!
//! An agent is anything that can answer the moderator's questions for
//! one seat: pick a night target, cast a vote, produce a speech. The
//! engine never talks to agents; the moderator solicits them, enforces
//! the timeout, validates the answer, and substitutes a fallback when
//! they fail. Agents therefore only ever see a [`PlayerView`] and a
//! legal set, and may answer with anything; illegal answers cost them
//! their turn, not the game.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::PlayerId;
use crate::engine::PlayerView;
use crate::roles::LegalNightAction;

/// Errors an agent may return instead of an answer.
///
/// Treated identically to a timeout by the moderator: retried, then
/// replaced by the fallback policy.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The backing decision process is unavailable (process died,
    /// endpoint unreachable).
    #[error("agent unavailable: {0}")]
    Unavailable(String),

    /// The agent produced output it could not turn into a decision.
    #[error("malformed agent response: {0}")]
    Malformed(String),
}

/// A decision-maker for one seat.
///
/// Implementations must be `Send + Sync`: the moderator solicits all
/// living seats concurrently during night and vote phases.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Pick a target for the seat's night ability.
    ///
    /// `legal.targets` is non-empty and the answer must come from it.
    async fn choose_night_target(
        &self,
        view: &PlayerView,
        legal: &LegalNightAction,
    ) -> Result<PlayerId, AgentError>;

    /// Cast a vote. `None` abstains. A `Some` answer must come from
    /// `candidates`.
    async fn choose_vote(
        &self,
        view: &PlayerView,
        candidates: &[PlayerId],
    ) -> Result<Option<PlayerId>, AgentError>;

    /// Produce one utterance for the current discussion turn. The
    /// channel (public or wolf chat) is implied by `view.phase` and the
    /// solicitation context.
    async fn speak(&self, view: &PlayerView) -> Result<String, AgentError>;
}
