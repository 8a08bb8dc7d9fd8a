//! Scripted agent for deterministic tests.
//!
//! Answers are pre-loaded queues consumed in order, one queue per
//! decision type. An exhausted queue returns an error, which lets a
//! test drive the moderator's retry and fallback path on an exact
//! solicitation. An optional artificial delay makes timeout behavior
//! testable without a real slow agent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::core::PlayerId;
use crate::engine::PlayerView;
use crate::roles::LegalNightAction;

use super::traits::{Agent, AgentError};

/// Agent that replays scripted answers.
#[derive(Default)]
pub struct ScriptedAgent {
    night_targets: Mutex<VecDeque<PlayerId>>,
    votes: Mutex<VecDeque<Option<PlayerId>>>,
    speeches: Mutex<VecDeque<String>>,
    delay: Option<Duration>,
}

impl ScriptedAgent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue night targets, consumed in order.
    #[must_use]
    pub fn with_night_targets(self, targets: impl IntoIterator<Item = PlayerId>) -> Self {
        if let Ok(mut queue) = self.night_targets.lock() {
            queue.extend(targets);
        }
        self
    }

    /// Queue votes, consumed in order. `None` abstains.
    #[must_use]
    pub fn with_votes(self, votes: impl IntoIterator<Item = Option<PlayerId>>) -> Self {
        if let Ok(mut queue) = self.votes.lock() {
            queue.extend(votes);
        }
        self
    }

    /// Queue speeches, consumed in order.
    #[must_use]
    pub fn with_speeches(self, speeches: impl IntoIterator<Item = impl Into<String>>) -> Self {
        if let Ok(mut queue) = self.speeches.lock() {
            queue.extend(speeches.into_iter().map(Into::into));
        }
        self
    }

    /// Delay every answer, for exercising the moderator's timeout.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn pop<T>(queue: &Mutex<VecDeque<T>>, what: &str) -> Result<T, AgentError> {
        queue
            .lock()
            .map_err(|_| AgentError::Unavailable("script queue poisoned".into()))?
            .pop_front()
            .ok_or_else(|| AgentError::Unavailable(format!("script exhausted: {what}")))
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn choose_night_target(
        &self,
        _view: &PlayerView,
        _legal: &LegalNightAction,
    ) -> Result<PlayerId, AgentError> {
        self.pause().await;
        Self::pop(&self.night_targets, "night target")
    }

    async fn choose_vote(
        &self,
        _view: &PlayerView,
        _candidates: &[PlayerId],
    ) -> Result<Option<PlayerId>, AgentError> {
        self.pause().await;
        Self::pop(&self.votes, "vote")
    }

    async fn speak(&self, _view: &PlayerView) -> Result<String, AgentError> {
        self.pause().await;
        Self::pop(&self.speeches, "speech")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameState;
    use crate::roles::{Role, RoleRegistry};

    #[test]
    fn test_queues_consume_in_order() {
        let agent = ScriptedAgent::new().with_votes([Some(PlayerId::new(1)), None]);
        let state = GameState::with_roles(
            &[Role::Werewolf, Role::Villager, Role::Villager, Role::Villager],
            1,
        );
        let view = state.view(PlayerId::new(0)).unwrap();
        let candidates = RoleRegistry::vote_candidates(&state, PlayerId::new(0));

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            assert_eq!(
                agent.choose_vote(&view, &candidates).await.unwrap(),
                Some(PlayerId::new(1))
            );
            assert_eq!(agent.choose_vote(&view, &candidates).await.unwrap(), None);
            assert!(agent.choose_vote(&view, &candidates).await.is_err());
        });
    }
}
