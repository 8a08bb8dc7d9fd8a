//! Seeded random baseline agent.
//!
//! Picks uniformly among the legal choices it is offered and emits
//! canned discussion lines. Useful as a benchmark floor and for
//! exercising the full game loop in tests without any external
//! decision process.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::core::{GameRng, PlayerId};
use crate::engine::{Phase, PlayerView};
use crate::roles::LegalNightAction;

use super::traits::{Agent, AgentError};

const CANNED_LINES: &[&str] = &[
    "I think we should discuss more before voting.",
    "I'm not sure who to trust right now.",
    "Let's hear from everyone before jumping to conclusions.",
    "Something feels off, but I can't put my finger on it.",
    "I've been paying close attention and I have my suspicions.",
    "We need to focus on finding the werewolves.",
    "I'm a villager. Let's work together.",
    "Does anyone have useful information to share?",
    "I think we should be careful about who we vote for.",
    "Let's not rush this decision.",
];

const SUSPICION_LINES: &[&str] = &[
    "I'm suspicious of {target}.",
    "I think {target} might be a werewolf.",
    "Has anyone else noticed {target} acting strange?",
    "{target} has been awfully quiet. That's suspicious.",
    "I don't trust {target}. Something about them feels off.",
];

const WOLF_LINES: &[&str] = &[
    "Let's target someone who seems dangerous.",
    "I think we should go after a quiet player.",
    "We need to eliminate the biggest threat.",
    "Any suggestions for tonight's target?",
];

/// Uniformly random agent with its own seeded RNG stream.
///
/// The RNG sits behind a mutex because the `Agent` trait takes `&self`
/// (solicitations run concurrently across seats, never within one).
pub struct RandomAgent {
    rng: Mutex<GameRng>,
}

impl RandomAgent {
    /// Create an agent with its own RNG stream.
    ///
    /// Derive one per seat from the game RNG, e.g.
    /// `rng.for_context("agent:3")`, so agent draws never perturb
    /// engine draws.
    #[must_use]
    pub fn new(rng: GameRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut GameRng) -> T) -> Result<T, AgentError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AgentError::Unavailable("agent rng poisoned".into()))?;
        Ok(f(&mut rng))
    }
}

#[async_trait]
impl Agent for RandomAgent {
    async fn choose_night_target(
        &self,
        _view: &PlayerView,
        legal: &LegalNightAction,
    ) -> Result<PlayerId, AgentError> {
        self.with_rng(|rng| rng.choose(&legal.targets).copied())?
            .ok_or_else(|| AgentError::Malformed("empty target set".into()))
    }

    async fn choose_vote(
        &self,
        _view: &PlayerView,
        candidates: &[PlayerId],
    ) -> Result<Option<PlayerId>, AgentError> {
        self.with_rng(|rng| rng.choose(candidates).copied())
    }

    async fn speak(&self, view: &PlayerView) -> Result<String, AgentError> {
        let others = view.living_others();
        self.with_rng(|rng| {
            // A speech solicited during the night phase is wolf chat.
            if view.phase == Phase::Night {
                let line = rng.choose(WOLF_LINES).copied().unwrap_or(WOLF_LINES[0]);
                return line.to_string();
            }
            if !others.is_empty() && rng.gen_bool(0.5) {
                if let Some(&target) = rng.choose(&others) {
                    let name = view.name_of(target).unwrap_or("someone").to_string();
                    let template = rng
                        .choose(SUSPICION_LINES)
                        .copied()
                        .unwrap_or(SUSPICION_LINES[0]);
                    return template.replace("{target}", &name);
                }
            }
            rng.choose(CANNED_LINES)
                .copied()
                .unwrap_or(CANNED_LINES[0])
                .to_string()
        })
    }
}
