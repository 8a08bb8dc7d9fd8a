//! Batch runs: many games, bounded parallelism, derived seeds.
//!
//! Each game in a batch gets its own seed forked from the batch seed,
//! so game `i` of a batch is reproducible on its own and the batch as a
//! whole replays identically. A game that aborts (an engine bug, not an
//! agent fault) is logged and skipped; the rest of the batch runs on.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::Agent;
use crate::core::{GameConfig, GameRng};
use crate::engine::{GameRecord, Verdict};

use super::runner::GameRunner;

/// Aggregate results of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Finished games in batch index order.
    pub records: Vec<GameRecord>,
    /// Games that aborted with an error.
    pub aborted: usize,
}

impl BatchReport {
    /// Count of games with the given verdict.
    #[must_use]
    pub fn verdict_count(&self, verdict: Verdict) -> usize {
        self.records.iter().filter(|r| r.verdict == verdict).count()
    }

    /// Total agent faults across the batch.
    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.records.iter().map(GameRecord::fault_count).sum()
    }
}

/// Runs a configuration many times with bounded parallelism.
pub struct BatchRunner<F> {
    config: GameConfig,
    agent_factory: F,
    parallelism: usize,
}

impl<F> BatchRunner<F>
where
    F: Fn(&GameConfig) -> Vec<Arc<dyn Agent>>,
{
    /// Create a batch runner. `agent_factory` is called once per game
    /// with that game's derived-seed configuration.
    #[must_use]
    pub fn new(config: GameConfig, agent_factory: F) -> Self {
        Self {
            config,
            agent_factory,
            parallelism: 4,
        }
    }

    /// Cap how many games run concurrently. Zero is treated as one.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Run `count` games and collect their records in index order.
    pub async fn run(&self, count: usize) -> BatchReport {
        info!(count, seed = self.config.seed, "batch start");
        let mut batch_rng = GameRng::new(self.config.seed);

        let games: Vec<(usize, GameConfig)> = (0..count)
            .map(|index| {
                let mut config = self.config.clone();
                config.seed = batch_rng.fork().seed();
                (index, config)
            })
            .collect();

        let mut finished: Vec<(usize, GameRecord)> = Vec::with_capacity(count);
        let mut aborted = 0;

        let mut results = stream::iter(games.into_iter().map(|(index, config)| async move {
            let agents = (self.agent_factory)(&config);
            let result = match GameRunner::new(config, agents) {
                Ok(runner) => runner.run().await,
                Err(err) => Err(err),
            };
            (index, result)
        }))
        .buffer_unordered(self.parallelism);

        while let Some((index, result)) = results.next().await {
            match result {
                Ok(record) => finished.push((index, record)),
                Err(err) => {
                    warn!(game = index, error = %err, "game aborted");
                    aborted += 1;
                }
            }
        }
        drop(results);

        finished.sort_by_key(|&(index, _)| index);
        let records: Vec<GameRecord> = finished.into_iter().map(|(_, record)| record).collect();
        info!(
            finished = records.len(),
            aborted,
            village = records.iter().filter(|r| r.verdict == Verdict::VillageWin).count(),
            wolves = records.iter().filter(|r| r.verdict == Verdict::WolvesWin).count(),
            "batch done"
        );

        BatchReport { records, aborted }
    }
}
