//! Declared actions and the complete-batch types the resolver consumes.
//!
//! The moderator collects one declaration per eligible actor into a
//! batch before any resolution logic runs. Batches are keyed by actor,
//! so the order in which agent replies arrived can never influence
//! resolution, and a duplicate or partial batch is rejected instead of
//! silently resolved.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::roles::AbilityKind;

use super::EngineError;

/// A night action declared by an agent, consumed exactly once by the
/// resolver for that round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredAction {
    pub actor: PlayerId,
    pub kind: AbilityKind,
    pub target: PlayerId,
    pub round: u32,
}

/// A vote cast by an agent. `target: None` is an abstention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: PlayerId,
    pub target: Option<PlayerId>,
    pub round: u32,
}

/// The complete set of night declarations for one round.
///
/// Completeness means every eligible actor is accounted for: either a
/// declaration or an explicit abstention. An abstained actor simply
/// exercises no ability that night.
#[derive(Clone, Debug, Default)]
pub struct NightBatch {
    round: u32,
    actions: FxHashMap<PlayerId, DeclaredAction>,
    abstained: FxHashSet<PlayerId>,
}

impl NightBatch {
    /// Create an empty batch for the given round.
    #[must_use]
    pub fn new(round: u32) -> Self {
        Self {
            round,
            actions: FxHashMap::default(),
            abstained: FxHashSet::default(),
        }
    }

    /// The round this batch belongs to.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Add a declaration. Each actor declares at most once per round.
    pub fn insert(&mut self, action: DeclaredAction) -> Result<(), EngineError> {
        if action.round != self.round {
            return Err(EngineError::RoundMismatch {
                batch_round: action.round,
                round: self.round,
            });
        }
        if self.abstained.contains(&action.actor)
            || self.actions.insert(action.actor, action).is_some()
        {
            return Err(EngineError::DuplicateDeclaration {
                round: self.round,
                actor: action.actor,
            });
        }
        Ok(())
    }

    /// Record that an actor exercises no ability this night.
    pub fn mark_abstained(&mut self, actor: PlayerId) -> Result<(), EngineError> {
        if self.actions.contains_key(&actor) || !self.abstained.insert(actor) {
            return Err(EngineError::DuplicateDeclaration {
                round: self.round,
                actor,
            });
        }
        Ok(())
    }

    /// Whether an actor has declared or abstained.
    #[must_use]
    pub fn contains(&self, actor: PlayerId) -> bool {
        self.actions.contains_key(&actor) || self.abstained.contains(&actor)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Declarations sorted by actor id.
    ///
    /// The sort gives callers a stable iteration order; resolution
    /// itself groups by ability kind and is insensitive to it.
    #[must_use]
    pub fn sorted_actions(&self) -> Vec<DeclaredAction> {
        let mut actions: Vec<_> = self.actions.values().copied().collect();
        actions.sort_by_key(|a| a.actor);
        actions
    }

    /// Actors present in the batch, abstainers included.
    pub fn actors(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.actions.keys().chain(self.abstained.iter()).copied()
    }
}

/// The complete set of votes for one round.
#[derive(Clone, Debug, Default)]
pub struct VoteBatch {
    round: u32,
    revote: bool,
    votes: FxHashMap<PlayerId, Vote>,
}

impl VoteBatch {
    /// Create an empty batch for the given round.
    #[must_use]
    pub fn new(round: u32) -> Self {
        Self {
            round,
            revote: false,
            votes: FxHashMap::default(),
        }
    }

    /// Create a batch for the re-vote pass of the `Revote` tie-break.
    #[must_use]
    pub fn revote(round: u32) -> Self {
        Self {
            round,
            revote: true,
            votes: FxHashMap::default(),
        }
    }

    /// The round this batch belongs to.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Whether this is the second (re-vote) pass.
    #[must_use]
    pub fn is_revote(&self) -> bool {
        self.revote
    }

    /// Add a vote. Each voter votes at most once per pass.
    pub fn insert(&mut self, vote: Vote) -> Result<(), EngineError> {
        if vote.round != self.round {
            return Err(EngineError::RoundMismatch {
                batch_round: vote.round,
                round: self.round,
            });
        }
        if self.votes.insert(vote.voter, vote).is_some() {
            return Err(EngineError::DuplicateDeclaration {
                round: self.round,
                actor: vote.voter,
            });
        }
        Ok(())
    }

    /// Whether a voter has cast.
    #[must_use]
    pub fn contains(&self, voter: PlayerId) -> bool {
        self.votes.contains_key(&voter)
    }

    /// Number of votes (abstentions included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Votes sorted by voter id.
    #[must_use]
    pub fn sorted_votes(&self) -> Vec<Vote> {
        let mut votes: Vec<_> = self.votes.values().copied().collect();
        votes.sort_by_key(|v| v.voter);
        votes
    }

    /// Voters present in the batch.
    pub fn voters(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.votes.keys().copied()
    }
}
