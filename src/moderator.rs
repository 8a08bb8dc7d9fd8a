//! The moderator: the asynchronous layer between agents and the engine.
//!
//! The moderator owns every conversation with an agent. It builds the
//! filtered view each seat is entitled to, solicits decisions under a
//! per-call timeout with retries, validates every answer against the
//! legal set, and substitutes the configured fallback when an agent
//! times out, errors, or keeps answering illegally. Whatever happens on
//! the agent side, the engine below only ever sees complete, legal
//! batches, and every substitution is recorded as an [`AgentFault`].
//!
//! Night and vote solicitations fan out concurrently across seats so a
//! slow agent delays the phase by at most the timeout, not the sum of
//! timeouts. Discussion and wolf chat stay sequential: each speaker
//! sees what was said before its turn.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::agents::{Agent, AgentError};
use crate::core::{ConfigError, FallbackPolicy, GameConfig, PlayerId, PlayerMap};
use crate::engine::{
    AgentFault, Channel, DeclaredAction, EngineError, FallbackApplied, FaultKind, GameState,
    NightBatch, NightOutcome, Phase, Resolver, RoundRecord, Speech, Vote, VoteBatch, VoteOutcome,
    VoteResolution,
};
use crate::roles::{LegalNightAction, RoleRegistry};

enum Reply<T> {
    Answer(T),
    Fault(FaultKind),
}

/// Drives one game's phases against a set of agents.
pub struct Moderator {
    config: GameConfig,
    agents: PlayerMap<Arc<dyn Agent>>,
}

impl Moderator {
    /// Create a moderator for a validated configuration, one agent per
    /// seat.
    pub fn new(config: GameConfig, agents: Vec<Arc<dyn Agent>>) -> Result<Self, ConfigError> {
        config.validate()?;
        if agents.len() != config.player_count {
            return Err(ConfigError::AgentCountMismatch {
                agents: agents.len(),
                player_count: config.player_count,
            });
        }
        let agents = PlayerMap::new(config.player_count, |p| Arc::clone(&agents[p.index()]));
        Ok(Self { config, agents })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Solicit one decision: timeout per attempt, retries, validation.
    ///
    /// Returns the first valid answer, or the last fault once attempts
    /// are exhausted. A timed-out attempt only drops its own future;
    /// concurrent solicitations of other seats are unaffected.
    async fn solicit<T, F, Fut>(&self, call: F, valid: impl Fn(&T) -> bool) -> Reply<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let attempts = 1 + self.config.agent_retries;
        let mut last = FaultKind::Timeout;
        for _ in 0..attempts {
            match timeout(self.config.agent_timeout, call()).await {
                Err(_) => last = FaultKind::Timeout,
                Ok(Err(err)) => last = FaultKind::Failure(err.to_string()),
                Ok(Ok(answer)) => {
                    if valid(&answer) {
                        return Reply::Answer(answer);
                    }
                    last = FaultKind::InvalidChoice;
                }
            }
        }
        Reply::Fault(last)
    }

    // === Night ===

    /// Run the night phase: wolf chat, concurrent ability solicitation,
    /// resolution at dawn.
    pub async fn run_night(
        &self,
        state: &mut GameState,
        record: &mut RoundRecord,
    ) -> Result<NightOutcome, EngineError> {
        state.phase = Phase::Night;
        let round = state.round;
        info!(round, "night falls");

        if self.config.wolf_chat {
            self.run_wolf_chat(state, record).await;
        }

        let solicitations: Vec<(PlayerId, _, LegalNightAction)> = RoleRegistry::night_eligible(state)
            .into_iter()
            .filter_map(|actor| {
                let legal = RoleRegistry::legal_night_action(state, actor)?;
                let view = state.view(actor)?;
                Some((actor, view, legal))
            })
            .collect();

        let replies = join_all(solicitations.iter().map(|(actor, view, legal)| {
            let agent = Arc::clone(&self.agents[*actor]);
            async move {
                self.solicit(
                    || agent.choose_night_target(view, legal),
                    |target| legal.targets.contains(target),
                )
                .await
            }
        }))
        .await;

        let mut batch = NightBatch::new(round);
        for ((actor, _, legal), reply) in solicitations.iter().zip(replies) {
            match reply {
                Reply::Answer(target) => batch.insert(DeclaredAction {
                    actor: *actor,
                    kind: legal.kind,
                    target,
                    round,
                })?,
                Reply::Fault(kind) => {
                    warn!(round, player = %actor, fault = %fault_name(&kind), "night solicitation failed");
                    let fallback =
                        self.apply_night_fallback(state, &mut batch, *actor, legal, round)?;
                    record.faults.push(AgentFault {
                        player: *actor,
                        round,
                        phase: Phase::Night,
                        kind,
                        fallback,
                    });
                }
            }
        }

        record.night_actions = batch.sorted_actions();
        state.phase = Phase::Dawn;
        let outcome = Resolver::resolve_night(state, &batch)?;
        for &death in &outcome.deaths {
            info!(round, player = %death, "died in the night");
        }
        if outcome.saved {
            info!(round, "the doctor's protection held");
        }
        record.night = Some(outcome.clone());
        Ok(outcome)
    }

    fn apply_night_fallback(
        &self,
        state: &GameState,
        batch: &mut NightBatch,
        actor: PlayerId,
        legal: &LegalNightAction,
        round: u32,
    ) -> Result<FallbackApplied, EngineError> {
        if self.config.fallback == FallbackPolicy::RandomLegal {
            let mut draw = state
                .rng()
                .for_context(&format!("fallback:night:{round}:{actor}"));
            if let Some(&target) = draw.choose(&legal.targets) {
                batch.insert(DeclaredAction {
                    actor,
                    kind: legal.kind,
                    target,
                    round,
                })?;
                return Ok(FallbackApplied::RandomLegal);
            }
        }
        batch.mark_abstained(actor)?;
        Ok(FallbackApplied::Abstained)
    }

    /// Sequential private exchange among living wolves. Skipped with
    /// fewer than two wolves alive.
    async fn run_wolf_chat(&self, state: &mut GameState, record: &mut RoundRecord) {
        let wolves = state.living_wolves();
        if wolves.len() < 2 {
            return;
        }
        for wolf in wolves {
            let Some(view) = state.view(wolf) else {
                continue;
            };
            let agent = Arc::clone(&self.agents[wolf]);
            match self.solicit(|| agent.speak(&view), |_: &String| true).await {
                Reply::Answer(text) => {
                    let speech = Speech {
                        speaker: wolf,
                        round: state.round,
                        channel: Channel::Wolf,
                        text,
                    };
                    record.wolf_chat.push(speech.clone());
                    state.record_speech(speech);
                }
                Reply::Fault(kind) => {
                    warn!(round = state.round, player = %wolf, "wolf chat turn skipped");
                    record.faults.push(AgentFault {
                        player: wolf,
                        round: state.round,
                        phase: Phase::Night,
                        kind,
                        fallback: FallbackApplied::SpeechSkipped,
                    });
                }
            }
        }
    }

    // === Day ===

    /// Run the discussion rounds, sequentially in seat order. Each
    /// speaker's view includes every speech made before its turn.
    pub async fn run_discussion(&self, state: &mut GameState, record: &mut RoundRecord) {
        state.phase = Phase::Day;
        for _ in 0..self.config.discussion_rounds {
            for speaker in state.living_ids() {
                let Some(view) = state.view(speaker) else {
                    continue;
                };
                let agent = Arc::clone(&self.agents[speaker]);
                match self.solicit(|| agent.speak(&view), |_: &String| true).await {
                    Reply::Answer(text) => {
                        let speech = Speech {
                            speaker,
                            round: state.round,
                            channel: Channel::Public,
                            text,
                        };
                        record.speeches.push(speech.clone());
                        state.record_speech(speech);
                    }
                    Reply::Fault(kind) => {
                        warn!(round = state.round, player = %speaker, "discussion turn skipped");
                        record.faults.push(AgentFault {
                            player: speaker,
                            round: state.round,
                            phase: Phase::Day,
                            kind,
                            fallback: FallbackApplied::SpeechSkipped,
                        });
                    }
                }
            }
        }
    }

    /// Run the vote: concurrent solicitation of every living seat, then
    /// resolution, with at most one re-vote under the `Revote` policy.
    pub async fn run_vote(
        &self,
        state: &mut GameState,
        record: &mut RoundRecord,
    ) -> Result<VoteOutcome, EngineError> {
        state.phase = Phase::Vote;
        let round = state.round;

        let outcome = match self.collect_and_resolve(state, record, None).await? {
            VoteResolution::Decided(outcome) => outcome,
            VoteResolution::Revote { tied } => {
                info!(round, ?tied, "vote tied; re-voting among tied candidates");
                match self.collect_and_resolve(state, record, Some(&tied)).await? {
                    VoteResolution::Decided(outcome) => outcome,
                    // The resolver always decides a re-vote pass.
                    VoteResolution::Revote { .. } => unreachable!("re-vote pass always decides"),
                }
            }
        };

        match outcome.eliminated {
            Some(player) => info!(round, %player, "eliminated by vote"),
            None => info!(round, tie = outcome.tie, "nobody eliminated"),
        }
        record.vote = Some(outcome.clone());
        Ok(outcome)
    }

    async fn collect_and_resolve(
        &self,
        state: &mut GameState,
        record: &mut RoundRecord,
        restrict: Option<&[PlayerId]>,
    ) -> Result<VoteResolution, EngineError> {
        let round = state.round;

        let solicitations: Vec<(PlayerId, _, Vec<PlayerId>)> = state
            .living_ids()
            .into_iter()
            .filter_map(|voter| {
                let mut candidates = RoleRegistry::vote_candidates(state, voter);
                if let Some(tied) = restrict {
                    candidates.retain(|c| tied.contains(c));
                }
                let view = state.view(voter)?;
                Some((voter, view, candidates))
            })
            .collect();

        let replies = join_all(solicitations.iter().map(|(voter, view, candidates)| {
            let agent = Arc::clone(&self.agents[*voter]);
            async move {
                self.solicit(
                    || agent.choose_vote(view, candidates),
                    |answer| answer.map_or(true, |t| candidates.contains(&t)),
                )
                .await
            }
        }))
        .await;

        let revote = restrict.is_some();
        let mut batch = if revote {
            VoteBatch::revote(round)
        } else {
            VoteBatch::new(round)
        };

        for ((voter, _, candidates), reply) in solicitations.iter().zip(replies) {
            let target = match reply {
                Reply::Answer(target) => target,
                Reply::Fault(kind) => {
                    warn!(round, player = %voter, fault = %fault_name(&kind), "vote solicitation failed");
                    let (target, fallback) = match self.config.fallback {
                        FallbackPolicy::RandomLegal => {
                            let mut draw = state.rng().for_context(&format!(
                                "fallback:vote:{round}:{revote}:{voter}"
                            ));
                            match draw.choose(candidates) {
                                Some(&choice) => (Some(choice), FallbackApplied::RandomLegal),
                                None => (None, FallbackApplied::Abstained),
                            }
                        }
                        FallbackPolicy::Abstain => (None, FallbackApplied::Abstained),
                    };
                    record.faults.push(AgentFault {
                        player: *voter,
                        round,
                        phase: Phase::Vote,
                        kind,
                        fallback,
                    });
                    target
                }
            };
            batch.insert(Vote {
                voter: *voter,
                target,
                round,
            })?;
        }

        record.votes.extend(batch.sorted_votes());
        Resolver::resolve_vote(state, &batch, self.config.tie_break)
    }
}

fn fault_name(kind: &FaultKind) -> &'static str {
    match kind {
        FaultKind::Timeout => "timeout",
        FaultKind::InvalidChoice => "invalid_choice",
        FaultKind::Failure(_) => "failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ScriptedAgent;
    use crate::core::TieBreakPolicy;
    use crate::roles::Role;
    use std::time::Duration;

    fn seat(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    // Seats: 0,1 wolves; 2 seer; 3 doctor; 4,5,6 villagers.
    fn classic_roles() -> [Role; 7] {
        [
            Role::Werewolf,
            Role::Werewolf,
            Role::Seer,
            Role::Doctor,
            Role::Villager,
            Role::Villager,
            Role::Villager,
        ]
    }

    fn classic_config() -> GameConfig {
        let mut config = GameConfig::classic(42);
        config.wolf_chat = false;
        config.agent_timeout = Duration::from_millis(50);
        config.agent_retries = 1;
        config
    }

    fn classic_state() -> GameState {
        let mut state = GameState::with_roles(&classic_roles(), 42);
        state.round = 1;
        state
    }

    fn agents(build: impl Fn(u8) -> ScriptedAgent) -> Vec<Arc<dyn Agent>> {
        (0..7).map(|i| Arc::new(build(i)) as Arc<dyn Agent>).collect()
    }

    #[tokio::test]
    async fn test_night_happy_path() {
        let agents = agents(|i| match i {
            0 | 1 => ScriptedAgent::new().with_night_targets([seat(4)]),
            2 => ScriptedAgent::new().with_night_targets([seat(0)]),
            3 => ScriptedAgent::new().with_night_targets([seat(2)]),
            _ => ScriptedAgent::new(),
        });
        let moderator = Moderator::new(classic_config(), agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        let outcome = moderator.run_night(&mut state, &mut record).await.unwrap();
        assert_eq!(outcome.deaths.as_slice(), &[seat(4)]);
        assert_eq!(outcome.inspections.len(), 1);
        assert_eq!(record.night_actions.len(), 4);
        assert!(record.faults.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_night_timeout_falls_back_to_random_legal() {
        // The doctor never answers in time; everyone else is prompt.
        let agents = agents(|i| match i {
            0 | 1 => ScriptedAgent::new().with_night_targets([seat(4); 4]),
            2 => ScriptedAgent::new().with_night_targets([seat(0); 4]),
            3 => ScriptedAgent::new()
                .with_night_targets([seat(2); 4])
                .with_delay(Duration::from_secs(60)),
            _ => ScriptedAgent::new(),
        });
        let moderator = Moderator::new(classic_config(), agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        let outcome = moderator.run_night(&mut state, &mut record).await.unwrap();
        // The protect still happened, on a seeded random target.
        assert_eq!(record.night_actions.len(), 4);
        assert_eq!(record.faults.len(), 1);
        assert_eq!(record.faults[0].player, seat(3));
        assert_eq!(record.faults[0].kind, FaultKind::Timeout);
        assert_eq!(record.faults[0].fallback, FallbackApplied::RandomLegal);
        assert_eq!(outcome.round, 1);
    }

    #[tokio::test]
    async fn test_invalid_night_choice_retried_then_replaced() {
        // Wolf 0 keeps targeting itself, which is illegal; after the
        // retries run out the moderator substitutes.
        let agents = agents(|i| match i {
            0 => ScriptedAgent::new().with_night_targets([seat(0), seat(0)]),
            1 => ScriptedAgent::new().with_night_targets([seat(4)]),
            2 => ScriptedAgent::new().with_night_targets([seat(1)]),
            3 => ScriptedAgent::new().with_night_targets([seat(3)]),
            _ => ScriptedAgent::new(),
        });
        let moderator = Moderator::new(classic_config(), agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        moderator.run_night(&mut state, &mut record).await.unwrap();
        assert_eq!(record.faults.len(), 1);
        assert_eq!(record.faults[0].kind, FaultKind::InvalidChoice);
    }

    #[tokio::test]
    async fn test_abstain_fallback_at_night() {
        let mut config = classic_config();
        config.fallback = FallbackPolicy::Abstain;
        // The seer's script is empty: solicitation errors immediately.
        let agents = agents(|i| match i {
            0 | 1 => ScriptedAgent::new().with_night_targets([seat(4); 2]),
            3 => ScriptedAgent::new().with_night_targets([seat(3); 2]),
            _ => ScriptedAgent::new(),
        });
        let moderator = Moderator::new(config, agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        let outcome = moderator.run_night(&mut state, &mut record).await.unwrap();
        assert!(outcome.inspections.is_empty());
        assert_eq!(record.faults[0].fallback, FallbackApplied::Abstained);
        // Three declarations, one abstention.
        assert_eq!(record.night_actions.len(), 3);
    }

    #[tokio::test]
    async fn test_vote_elimination() {
        let agents = agents(|i| match i {
            0 | 1 | 2 | 3 => ScriptedAgent::new().with_votes([Some(seat(4))]),
            _ => ScriptedAgent::new().with_votes([Some(seat(0))]),
        });
        let moderator = Moderator::new(classic_config(), agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        let outcome = moderator.run_vote(&mut state, &mut record).await.unwrap();
        assert_eq!(outcome.eliminated, Some(seat(4)));
        assert!(!state.player(seat(4)).unwrap().alive);
        assert_eq!(record.votes.len(), 7);
    }

    #[tokio::test]
    async fn test_revote_policy_runs_second_pass() {
        let config = classic_config().with_tie_break(TieBreakPolicy::Revote);
        // First pass ties 0 and 4 at 3-3; second pass converges on 0.
        let agents = agents(|i| match i {
            0 => ScriptedAgent::new().with_votes([Some(seat(4)), Some(seat(4))]),
            1 | 2 => ScriptedAgent::new().with_votes([Some(seat(4)), Some(seat(0))]),
            4 => ScriptedAgent::new().with_votes([Some(seat(0)), None]),
            5 | 6 => ScriptedAgent::new().with_votes([Some(seat(0)), Some(seat(0))]),
            _ => ScriptedAgent::new().with_votes([None, Some(seat(0))]),
        });
        let moderator = Moderator::new(config, agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        let outcome = moderator.run_vote(&mut state, &mut record).await.unwrap();
        assert!(outcome.revoted);
        assert_eq!(outcome.eliminated, Some(seat(0)));
        // Both passes recorded.
        assert_eq!(record.votes.len(), 14);
    }

    #[tokio::test]
    async fn test_discussion_speeches_accumulate() {
        let agents = agents(|i| {
            ScriptedAgent::new().with_speeches([format!("seat {i} round a"), format!("seat {i} round b")])
        });
        let mut config = classic_config();
        config.discussion_rounds = 2;
        let moderator = Moderator::new(config, agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        moderator.run_discussion(&mut state, &mut record).await;
        assert_eq!(record.speeches.len(), 14);
        assert_eq!(state.view(seat(6)).unwrap().speeches.len(), 14);
        // Speaking order is seat order within each discussion round.
        assert_eq!(record.speeches[0].speaker, seat(0));
        assert_eq!(record.speeches[7].speaker, seat(0));
    }

    #[tokio::test]
    async fn test_wolf_chat_recorded_and_private() {
        let mut config = classic_config();
        config.wolf_chat = true;
        let agents = agents(|i| match i {
            0 | 1 => ScriptedAgent::new()
                .with_speeches(["take the seer", "agreed"])
                .with_night_targets([seat(2)]),
            2 => ScriptedAgent::new().with_night_targets([seat(0)]),
            3 => ScriptedAgent::new().with_night_targets([seat(3)]),
            _ => ScriptedAgent::new(),
        });
        let moderator = Moderator::new(config, agents).unwrap();
        let mut state = classic_state();
        let mut record = RoundRecord::new(1);

        moderator.run_night(&mut state, &mut record).await.unwrap();
        assert_eq!(record.wolf_chat.len(), 2);
        assert!(state.view(seat(1)).unwrap().wolf_chat.len() == 2);
        assert!(state.view(seat(4)).unwrap().wolf_chat.is_empty());
    }

    #[test]
    fn test_agent_count_must_match() {
        let result = Moderator::new(classic_config(), Vec::new());
        assert!(matches!(
            result,
            Err(ConfigError::AgentCountMismatch { agents: 0, .. })
        ));
    }
}
