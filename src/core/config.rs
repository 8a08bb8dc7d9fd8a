//! Game configuration: immutable per-game parameters.
//!
//! The engine consumes a validated `GameConfig` and never mutates it.
//! External layers (YAML loading, CLI) construct one of these and call
//! [`GameConfig::validate`] before any game state is created; a bad
//! role distribution is a fatal setup error, not a runtime one.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::roles::Role;

/// Fatal configuration errors. Detected at setup, before any game state
/// exists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Role counts do not add up to the player count.
    #[error("role counts sum to {role_total} but player_count is {player_count}")]
    RoleCountMismatch {
        role_total: usize,
        player_count: usize,
    },

    /// A game needs at least one werewolf to be a game.
    #[error("role distribution contains no werewolf")]
    NoWerewolf,

    /// Wolves must start outnumbered or the game is over at setup.
    #[error("{wolves} werewolves cannot face {villagers} village players")]
    WolvesNotOutnumbered { wolves: usize, villagers: usize },

    /// Player count outside the supported range.
    #[error("player_count must be in 3..=255, got {0}")]
    BadPlayerCount(usize),

    /// The round safety cutoff must allow at least one round.
    #[error("max_rounds must be at least 1")]
    ZeroMaxRounds,

    /// Display names, when provided, must cover every seat.
    #[error("{names} display names provided for {player_count} players")]
    NameCountMismatch { names: usize, player_count: usize },

    /// Every seat needs exactly one agent.
    #[error("{agents} agents provided for {player_count} players")]
    AgentCountMismatch { agents: usize, player_count: usize },
}

/// A role and how many seats receive it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: usize,
}

/// Deterministic rule applied when a vote tally has no unique maximum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreakPolicy {
    /// Nobody is eliminated on a tie.
    #[default]
    NoElimination,
    /// A seeded random pick among the tied candidates (id-sorted before
    /// the draw, so hash iteration order never leaks into the result).
    RandomAmongTied,
    /// One re-vote restricted to the tied candidates; a second tie
    /// eliminates nobody.
    Revote,
}

/// Substitute applied when an agent times out, errors, or returns an
/// illegal choice after all retries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// A seeded random legal choice is cast on the player's behalf.
    #[default]
    RandomLegal,
    /// The player abstains (night: no action, vote: no ballot weight).
    Abstain,
}

/// Complete per-game configuration.
///
/// Built with the builder methods, then validated once:
///
/// ```
/// use wolf_arena::core::GameConfig;
///
/// let config = GameConfig::classic(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.player_count, 7);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (3-255).
    pub player_count: usize,

    /// Role distribution. Counts must sum to `player_count`.
    pub roles: Vec<RoleCount>,

    /// Display names per seat. Empty means "Player N" defaults.
    pub names: Vec<String>,

    /// Whether the game has a Night phase at all. The speed variant
    /// disables it.
    pub night_enabled: bool,

    /// Whether living wolves exchange private messages before declaring
    /// their kill (only relevant with 2+ living wolves).
    pub wolf_chat: bool,

    /// Day discussion rounds before the vote. 0 skips discussion.
    pub discussion_rounds: u32,

    /// Tie-break rule for the day vote.
    pub tie_break: TieBreakPolicy,

    /// Fallback for failed agent solicitations.
    pub fallback: FallbackPolicy,

    /// Per-solicitation timeout.
    pub agent_timeout: Duration,

    /// Retries after a failed solicitation before the fallback applies.
    pub agent_retries: u32,

    /// Safety cutoff: maximum rounds before the game ends with a
    /// no-result verdict.
    pub max_rounds: u32,

    /// Seed for all in-game randomness.
    pub seed: u64,
}

impl GameConfig {
    /// Create a configuration with defaults and no role distribution.
    ///
    /// Callers must add roles via [`with_roles`](Self::with_roles);
    /// `validate` rejects an empty distribution.
    #[must_use]
    pub fn new(player_count: usize, seed: u64) -> Self {
        Self {
            player_count,
            roles: Vec::new(),
            names: Vec::new(),
            night_enabled: true,
            wolf_chat: true,
            discussion_rounds: 2,
            tie_break: TieBreakPolicy::default(),
            fallback: FallbackPolicy::default(),
            agent_timeout: Duration::from_secs(120),
            agent_retries: 2,
            max_rounds: 15,
            seed,
        }
    }

    /// The classic 7-player setup: 2 werewolves, 1 seer, 1 doctor,
    /// 3 villagers.
    #[must_use]
    pub fn classic(seed: u64) -> Self {
        Self::new(7, seed).with_roles([
            (Role::Werewolf, 2),
            (Role::Seer, 1),
            (Role::Doctor, 1),
            (Role::Villager, 3),
        ])
    }

    /// The speed variant: one wolf, no night phase, one discussion
    /// round, a single vote.
    #[must_use]
    pub fn speed(player_count: usize, seed: u64) -> Self {
        let mut config = Self::new(player_count, seed).with_roles([
            (Role::Werewolf, 1),
            (Role::Villager, player_count.saturating_sub(1)),
        ]);
        config.night_enabled = false;
        config.wolf_chat = false;
        config.discussion_rounds = 1;
        config.max_rounds = 1;
        config
    }

    /// Set the role distribution.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = (Role, usize)>) -> Self {
        self.roles = roles
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect();
        self
    }

    /// Set display names (one per seat).
    #[must_use]
    pub fn with_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the vote tie-break policy.
    #[must_use]
    pub fn with_tie_break(mut self, policy: TieBreakPolicy) -> Self {
        self.tie_break = policy;
        self
    }

    /// Set the agent failure fallback policy.
    #[must_use]
    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    /// Set the per-solicitation timeout.
    #[must_use]
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Set the round safety cutoff.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Display name for a seat.
    #[must_use]
    pub fn display_name(&self, seat: usize) -> String {
        self.names
            .get(seat)
            .cloned()
            .unwrap_or_else(|| format!("Player {seat}"))
    }

    /// Total wolves in the distribution.
    #[must_use]
    pub fn wolf_count(&self) -> usize {
        self.roles
            .iter()
            .filter(|rc| rc.role.faction() == crate::roles::Faction::Wolves)
            .map(|rc| rc.count)
            .sum()
    }

    /// Check the configuration for fatal errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_count < 3 || self.player_count > 255 {
            return Err(ConfigError::BadPlayerCount(self.player_count));
        }

        let role_total: usize = self.roles.iter().map(|rc| rc.count).sum();
        if role_total != self.player_count {
            return Err(ConfigError::RoleCountMismatch {
                role_total,
                player_count: self.player_count,
            });
        }

        let wolves = self.wolf_count();
        if wolves == 0 {
            return Err(ConfigError::NoWerewolf);
        }
        let villagers = self.player_count - wolves;
        if wolves >= villagers {
            return Err(ConfigError::WolvesNotOutnumbered { wolves, villagers });
        }

        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroMaxRounds);
        }

        if !self.names.is_empty() && self.names.len() != self.player_count {
            return Err(ConfigError::NameCountMismatch {
                names: self.names.len(),
                player_count: self.player_count,
            });
        }

        Ok(())
    }
}
