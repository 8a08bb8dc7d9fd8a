//! One complete game from setup to verdict.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::agents::Agent;
use crate::core::{ConfigError, GameConfig};
use crate::engine::{
    check_victory, EngineError, GameRecord, GameState, Phase, RoundRecord, Verdict,
};
use crate::moderator::Moderator;
use crate::roles::Faction;

/// Errors that abort a game run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Runs a single game to completion.
///
/// ```no_run
/// use std::sync::Arc;
/// use wolf_arena::agents::{Agent, RandomAgent};
/// use wolf_arena::core::{GameConfig, GameRng};
/// use wolf_arena::session::GameRunner;
///
/// # async fn run() -> Result<(), wolf_arena::session::RunnerError> {
/// let config = GameConfig::classic(42);
/// let rng = GameRng::new(config.seed);
/// let agents: Vec<Arc<dyn Agent>> = (0..7)
///     .map(|i| {
///         Arc::new(RandomAgent::new(rng.for_context(&format!("agent:{i}")))) as Arc<dyn Agent>
///     })
///     .collect();
///
/// let record = GameRunner::new(config, agents)?.run().await?;
/// println!("{} after {} rounds", record.verdict, record.total_rounds());
/// # Ok(())
/// # }
/// ```
pub struct GameRunner {
    moderator: Moderator,
}

impl GameRunner {
    /// Create a runner. Fails on an invalid configuration or an agent
    /// count that does not match the seat count.
    pub fn new(config: GameConfig, agents: Vec<Arc<dyn Agent>>) -> Result<Self, RunnerError> {
        Ok(Self {
            moderator: Moderator::new(config, agents)?,
        })
    }

    /// Play the game to its verdict.
    ///
    /// Rounds run `Night → Dawn → Day → Vote` (night skipped when
    /// disabled), with a victory check after each resolution. Reaching
    /// the round cutoff with both factions alive ends the game with
    /// [`Verdict::Cutoff`].
    pub async fn run(&self) -> Result<GameRecord, RunnerError> {
        let config = self.moderator.config().clone();
        let mut state = GameState::setup(&config)?;
        info!(seed = config.seed, players = config.player_count, "game start");

        let mut rounds = Vec::new();
        let mut verdict = None;

        for round in 1..=config.max_rounds {
            state.round = round;
            let mut record = RoundRecord::new(round);

            if config.night_enabled {
                self.moderator.run_night(&mut state, &mut record).await?;
                if let Some(winner) = check_victory(&state) {
                    verdict = Some(Self::verdict_for(winner));
                    Self::finish_round(&mut state, &mut rounds, record);
                    break;
                }
            }

            self.moderator.run_discussion(&mut state, &mut record).await;
            self.moderator.run_vote(&mut state, &mut record).await?;

            let winner = check_victory(&state);
            Self::finish_round(&mut state, &mut rounds, record);
            if let Some(winner) = winner {
                verdict = Some(Self::verdict_for(winner));
                break;
            }
        }

        let verdict = verdict.unwrap_or(Verdict::Cutoff);
        state.phase = Phase::End;
        info!(%verdict, rounds = rounds.len(), "game over");

        Ok(GameRecord {
            seed: config.seed,
            roster: state.roster(),
            rounds,
            verdict,
        })
    }

    fn verdict_for(winner: Faction) -> Verdict {
        match winner {
            Faction::Village => Verdict::VillageWin,
            Faction::Wolves => Verdict::WolvesWin,
        }
    }

    fn finish_round(state: &mut GameState, rounds: &mut Vec<RoundRecord>, record: RoundRecord) {
        state.push_record(record.clone());
        rounds.push(record);
    }
}
