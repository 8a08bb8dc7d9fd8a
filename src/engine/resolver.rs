//! Deterministic resolution of complete night and vote batches.
//!
//! The resolver is the only code that turns declarations into state
//! changes. It accepts nothing but a complete batch for the current
//! round, re-checks legality of every declaration, and resolves in a
//! fixed order: inspections, then protections, then kills. Seat order
//! never influences an outcome; the only randomness is drawn from
//! per-round context streams of the game seed, over id-sorted
//! candidates.

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::core::{PlayerId, TieBreakPolicy};
use crate::roles::{AbilityKind, RoleRegistry};

use super::action::{NightBatch, VoteBatch};
use super::outcome::{Inspection, NightOutcome, VoteOutcome};
use super::state::GameState;
use super::EngineError;

/// Outcome of a vote resolution pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteResolution {
    /// The vote is settled (with or without an elimination).
    Decided(VoteOutcome),
    /// The tally tied under `TieBreakPolicy::Revote` and a second pass
    /// restricted to these candidates (id-sorted) is required.
    Revote { tied: Vec<PlayerId> },
}

/// Stateless resolution functions over `GameState`.
pub struct Resolver;

impl Resolver {
    /// Resolve a complete night batch.
    ///
    /// Deaths are applied to the state and inspections delivered to the
    /// seer's private knowledge. Fails without touching the state if
    /// the batch is for the wrong round, incomplete, contains an
    /// ineligible actor, or targets illegally.
    pub fn resolve_night(
        state: &mut GameState,
        batch: &NightBatch,
    ) -> Result<NightOutcome, EngineError> {
        if batch.round() != state.round {
            return Err(EngineError::RoundMismatch {
                batch_round: batch.round(),
                round: state.round,
            });
        }

        let eligible = RoleRegistry::night_eligible(state);
        if let Some(&missing) = eligible.iter().find(|id| !batch.contains(**id)) {
            return Err(EngineError::IncompleteBatch {
                round: state.round,
                missing,
            });
        }
        for actor in batch.actors() {
            if !eligible.contains(&actor) {
                return Err(EngineError::IneligibleActor {
                    round: state.round,
                    actor,
                });
            }
        }

        let actions = batch.sorted_actions();
        for action in &actions {
            let legal = RoleRegistry::legal_night_action(state, action.actor).ok_or(
                EngineError::IneligibleActor {
                    round: state.round,
                    actor: action.actor,
                },
            )?;
            if legal.kind != action.kind || !legal.targets.contains(&action.target) {
                return Err(EngineError::IllegalTarget {
                    actor: action.actor,
                    target: action.target,
                });
            }
        }

        // Inspections read the roster before anything else happens
        // tonight; a seer inspecting tonight's victim still learns the
        // role.
        let mut inspections = Vec::new();
        let mut protected: FxHashSet<PlayerId> = FxHashSet::default();
        let mut kill_votes: Vec<PlayerId> = Vec::new();

        for action in &actions {
            match action.kind {
                AbilityKind::Inspect => {
                    if let Some(target) = state.player(action.target) {
                        inspections.push(Inspection {
                            seer: action.actor,
                            target: action.target,
                            role: target.role,
                            round: state.round,
                        });
                    }
                }
                AbilityKind::Protect => {
                    protected.insert(action.target);
                }
                AbilityKind::Kill => {
                    kill_votes.push(action.target);
                }
            }
        }

        let kill_target = Self::wolf_consensus(state, &kill_votes);

        let mut deaths: SmallVec<[PlayerId; 2]> = SmallVec::new();
        let mut saved = false;
        if let Some(target) = kill_target {
            if protected.contains(&target) {
                saved = true;
            } else {
                deaths.push(target);
            }
        }
        deaths.sort_unstable();

        for &id in &deaths {
            state.mark_dead(id, state.round);
        }
        state.record_inspections(&inspections);

        let mut protected: Vec<_> = protected.into_iter().collect();
        protected.sort_unstable();

        Ok(NightOutcome {
            round: state.round,
            deaths,
            protected,
            saved,
            inspections,
        })
    }

    /// Pick the pack's single kill target from individual submissions.
    ///
    /// One wolf: its pick. Two wolves: unanimity or no kill. Three or
    /// more: strict majority or no kill. A tie among top targets that
    /// still meets the threshold is broken by a seeded draw over
    /// id-sorted candidates.
    fn wolf_consensus(state: &GameState, kill_votes: &[PlayerId]) -> Option<PlayerId> {
        if kill_votes.is_empty() {
            return None;
        }

        let mut tally: FxHashMap<PlayerId, usize> = FxHashMap::default();
        for &target in kill_votes {
            *tally.entry(target).or_insert(0) += 1;
        }
        let max_votes = tally.values().copied().max()?;

        let required = if kill_votes.len() <= 2 {
            kill_votes.len()
        } else {
            kill_votes.len() / 2 + 1
        };
        if max_votes < required {
            return None;
        }

        let mut top: Vec<PlayerId> = tally
            .into_iter()
            .filter(|&(_, count)| count == max_votes)
            .map(|(id, _)| id)
            .collect();
        top.sort_unstable();

        let mut draw = state
            .rng()
            .for_context(&format!("wolf_kill:{}", state.round));
        draw.choose(&top).copied()
    }

    /// Resolve a complete vote batch.
    ///
    /// Abstentions carry no tally weight. A unique maximum eliminates;
    /// a tie follows `policy`. Under `Revote`, the first tied pass
    /// returns [`VoteResolution::Revote`] and the caller re-solicits; a
    /// tie on the second pass eliminates nobody.
    pub fn resolve_vote(
        state: &mut GameState,
        batch: &VoteBatch,
        policy: TieBreakPolicy,
    ) -> Result<VoteResolution, EngineError> {
        if batch.round() != state.round {
            return Err(EngineError::RoundMismatch {
                batch_round: batch.round(),
                round: state.round,
            });
        }

        let living = state.living_ids();
        if let Some(&missing) = living.iter().find(|id| !batch.contains(**id)) {
            return Err(EngineError::IncompleteBatch {
                round: state.round,
                missing,
            });
        }
        for voter in batch.voters() {
            if !living.contains(&voter) {
                return Err(EngineError::IneligibleActor {
                    round: state.round,
                    actor: voter,
                });
            }
        }

        let votes = batch.sorted_votes();
        for vote in &votes {
            if let Some(target) = vote.target {
                if target == vote.voter || !living.contains(&target) {
                    return Err(EngineError::IllegalTarget {
                        actor: vote.voter,
                        target,
                    });
                }
            }
        }

        let mut counts: FxHashMap<PlayerId, u32> = FxHashMap::default();
        for vote in &votes {
            if let Some(target) = vote.target {
                *counts.entry(target).or_insert(0) += 1;
            }
        }

        let mut tally: Vec<(PlayerId, u32)> = counts.into_iter().collect();
        tally.sort_unstable_by_key(|&(id, _)| id);

        let max_votes = tally.iter().map(|&(_, n)| n).max().unwrap_or(0);
        let mut tied: Vec<PlayerId> = tally
            .iter()
            .filter(|&&(_, n)| n == max_votes)
            .map(|&(id, _)| id)
            .collect();
        tied.sort_unstable();

        let mut outcome = VoteOutcome {
            round: state.round,
            tally,
            eliminated: None,
            tie: tied.len() > 1,
            revoted: batch.is_revote(),
        };

        if max_votes == 0 {
            // Everyone abstained. Nothing to break.
            outcome.tie = false;
            return Ok(VoteResolution::Decided(outcome));
        }

        if tied.len() == 1 {
            outcome.eliminated = Some(tied[0]);
        } else {
            match policy {
                TieBreakPolicy::NoElimination => {}
                TieBreakPolicy::RandomAmongTied => {
                    let mut draw = state.rng().for_context(&format!(
                        "vote_tiebreak:{}:{}",
                        state.round,
                        batch.is_revote()
                    ));
                    outcome.eliminated = draw.choose(&tied).copied();
                }
                TieBreakPolicy::Revote => {
                    if !batch.is_revote() {
                        return Ok(VoteResolution::Revote { tied });
                    }
                    // Second tie: nobody goes.
                }
            }
        }

        if let Some(id) = outcome.eliminated {
            state.mark_dead(id, state.round);
        }

        Ok(VoteResolution::Decided(outcome))
    }
}
