//! Resolution property and scenario tests.
//!
//! The resolver is the deterministic heart of the engine: these tests
//! pin down determinism, seat neutrality, tally accounting, and the
//! canonical protect/inspect/kill interactions on full game states.

use proptest::prelude::*;

use wolf_arena::core::{PlayerId, TieBreakPolicy};
use wolf_arena::engine::{
    check_victory, DeclaredAction, GameState, NightBatch, Resolver, Vote, VoteBatch,
    VoteResolution,
};
use wolf_arena::roles::{AbilityKind, Faction, Role};

fn seat(id: u8) -> PlayerId {
    PlayerId::new(id)
}

/// Seats: 0 werewolf, 1 doctor, 2 seer, 3-6 villagers.
fn lone_wolf_roles() -> [Role; 7] {
    [
        Role::Werewolf,
        Role::Doctor,
        Role::Seer,
        Role::Villager,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ]
}

fn state_with(roles: &[Role], round: u32, game_seed: u64) -> GameState {
    let mut state = GameState::with_roles(roles, game_seed);
    state.round = round;
    state
}

fn night_action(actor: u8, kind: AbilityKind, target: u8, round: u32) -> DeclaredAction {
    DeclaredAction {
        actor: seat(actor),
        kind,
        target: seat(target),
        round,
    }
}

/// The canonical saved-victim night: the wolf targets a villager, the
/// doctor protects that villager, the seer inspects the wolf. Nobody
/// dies and the seer learns the wolf's role.
#[test]
fn test_protected_target_survives_and_seer_learns_role() {
    let mut state = state_with(&lone_wolf_roles(), 1, 42);

    let mut batch = NightBatch::new(1);
    batch.insert(night_action(0, AbilityKind::Kill, 3, 1)).unwrap();
    batch.insert(night_action(1, AbilityKind::Protect, 3, 1)).unwrap();
    batch.insert(night_action(2, AbilityKind::Inspect, 0, 1)).unwrap();

    let outcome = Resolver::resolve_night(&mut state, &batch).unwrap();

    assert!(outcome.deaths.is_empty());
    assert!(outcome.saved);
    assert_eq!(outcome.inspections.len(), 1);
    assert_eq!(outcome.inspections[0].seer, seat(2));
    assert_eq!(outcome.inspections[0].role, Role::Werewolf);
    assert_eq!(state.living_ids().len(), 7);
}

/// Continuation of the scenario: a tied day vote must break exactly the
/// same way for the same seed, per the configured policy.
#[test]
fn test_tied_vote_breaks_deterministically_for_a_seed() {
    let run = || {
        let mut state = state_with(&lone_wolf_roles(), 1, 42);
        let mut batch = VoteBatch::new(1);
        // 3 and 4 tie at two votes each; the wolf receives none.
        for (voter, target) in [
            (0, Some(3)),
            (1, Some(3)),
            (2, Some(4)),
            (3, Some(4)),
            (4, None),
            (5, None),
            (6, None),
        ] {
            batch
                .insert(Vote {
                    voter: seat(voter),
                    target: target.map(seat),
                    round: 1,
                })
                .unwrap();
        }
        Resolver::resolve_vote(&mut state, &batch, TieBreakPolicy::RandomAmongTied).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);

    let VoteResolution::Decided(outcome) = first else {
        panic!("RandomAmongTied always decides");
    };
    assert!(outcome.tie);
    let eliminated = outcome.eliminated.unwrap();
    assert!(eliminated == seat(3) || eliminated == seat(4));
}

/// Once the last wolf dies, the very next victory check ends the game.
#[test]
fn test_village_win_immediately_after_last_wolf_dies() {
    let mut state = state_with(&lone_wolf_roles(), 1, 7);
    assert_eq!(check_victory(&state), None);

    let mut batch = VoteBatch::new(1);
    for voter in 1..7u8 {
        batch
            .insert(Vote {
                voter: seat(voter),
                target: Some(seat(0)),
                round: 1,
            })
            .unwrap();
    }
    batch
        .insert(Vote {
            voter: seat(0),
            target: Some(seat(1)),
            round: 1,
        })
        .unwrap();

    let resolution =
        Resolver::resolve_vote(&mut state, &batch, TieBreakPolicy::NoElimination).unwrap();
    let VoteResolution::Decided(outcome) = resolution else {
        panic!("unique maximum decides");
    };
    assert_eq!(outcome.eliminated, Some(seat(0)));
    assert_eq!(check_victory(&state), Some(Faction::Village));
}

/// Seat neutrality: permuting which seats hold which roles, and
/// permuting the actions to match, permutes the outcome and nothing
/// else.
#[test]
fn test_resolution_is_seat_neutral() {
    // Base: wolf in seat 0 kills seat 3, doctor in seat 1 protects
    // seat 4, seer in seat 2 inspects seat 0.
    let mut base = state_with(&lone_wolf_roles(), 1, 9);
    let mut base_batch = NightBatch::new(1);
    base_batch.insert(night_action(0, AbilityKind::Kill, 3, 1)).unwrap();
    base_batch.insert(night_action(1, AbilityKind::Protect, 4, 1)).unwrap();
    base_batch.insert(night_action(2, AbilityKind::Inspect, 0, 1)).unwrap();
    let base_outcome = Resolver::resolve_night(&mut base, &base_batch).unwrap();

    // Permuted: reverse the seating (seat i -> seat 6 - i).
    let permute = |id: PlayerId| seat(6 - id.0);
    let mut roles = lone_wolf_roles();
    roles.reverse();
    let mut permuted = state_with(&roles, 1, 9);
    let mut permuted_batch = NightBatch::new(1);
    for action in base_batch.sorted_actions() {
        permuted_batch
            .insert(DeclaredAction {
                actor: permute(action.actor),
                kind: action.kind,
                target: permute(action.target),
                round: action.round,
            })
            .unwrap();
    }
    let permuted_outcome = Resolver::resolve_night(&mut permuted, &permuted_batch).unwrap();

    let mapped_deaths: Vec<PlayerId> = base_outcome.deaths.iter().copied().map(permute).collect();
    assert_eq!(permuted_outcome.deaths.to_vec(), mapped_deaths);
    assert_eq!(permuted_outcome.saved, base_outcome.saved);
    assert_eq!(
        permuted_outcome.inspections[0].role,
        base_outcome.inspections[0].role
    );
}

/// A dead player's vote is rejected outright, never silently dropped.
#[test]
fn test_dead_voter_never_counted() {
    let mut state = state_with(&lone_wolf_roles(), 2, 11);
    state.mark_dead(seat(5), 1);

    let mut batch = VoteBatch::new(2);
    for voter in [0u8, 1, 2, 3, 4, 6, 5] {
        let target = if voter == 6 { seat(1) } else { seat(0) };
        batch
            .insert(Vote {
                voter: seat(voter),
                target: Some(target),
                round: 2,
            })
            .unwrap();
    }

    assert!(Resolver::resolve_vote(&mut state, &batch, TieBreakPolicy::NoElimination).is_err());
}

proptest! {
    /// Determinism: identical state and batch always produce identical
    /// outcomes and identical next states.
    #[test]
    fn prop_night_resolution_deterministic(game_seed in any::<u64>(), wolf_target in 1u8..7, protect_target in 0u8..7, inspect_target in 0u8..7) {
        prop_assume!(inspect_target != 2);

        let build_batch = || {
            let mut batch = NightBatch::new(1);
            batch.insert(night_action(0, AbilityKind::Kill, wolf_target, 1)).unwrap();
            batch.insert(night_action(1, AbilityKind::Protect, protect_target, 1)).unwrap();
            batch.insert(night_action(2, AbilityKind::Inspect, inspect_target, 1)).unwrap();
            batch
        };

        let mut a = state_with(&lone_wolf_roles(), 1, game_seed);
        let mut b = state_with(&lone_wolf_roles(), 1, game_seed);
        let oa = Resolver::resolve_night(&mut a, &build_batch()).unwrap();
        let ob = Resolver::resolve_night(&mut b, &build_batch()).unwrap();

        prop_assert_eq!(oa, ob);
        prop_assert_eq!(a.living_ids(), b.living_ids());
    }

    /// The tally sums to the number of living voters who named a
    /// target; abstentions carry no weight.
    #[test]
    fn prop_vote_tally_sums_to_cast_votes(game_seed in any::<u64>(), raw_votes in proptest::collection::vec(proptest::option::of(0u8..7), 7)) {
        let mut state = state_with(&lone_wolf_roles(), 1, game_seed);
        let mut batch = VoteBatch::new(1);
        let mut cast = 0u32;

        for (voter, target) in raw_votes.iter().enumerate() {
            // Redirect illegal self-votes to the next seat over.
            let target = target.map(|t| {
                if t == voter as u8 { (t + 1) % 7 } else { t }
            });
            if target.is_some() {
                cast += 1;
            }
            batch.insert(Vote {
                voter: seat(voter as u8),
                target: target.map(seat),
                round: 1,
            }).unwrap();
        }

        let resolution = Resolver::resolve_vote(&mut state, &batch, TieBreakPolicy::NoElimination).unwrap();
        let VoteResolution::Decided(outcome) = resolution else {
            panic!("NoElimination always decides");
        };
        let total: u32 = outcome.tally.iter().map(|&(_, n)| n).sum();
        prop_assert_eq!(total, cast);
    }

    /// Vote resolution never eliminates a dead player or the game's
    /// only living wolf by accident of hashing: the eliminated player,
    /// when present, always appears in the tally with the maximum.
    #[test]
    fn prop_eliminated_player_held_the_maximum(raw_votes in proptest::collection::vec(proptest::option::of(0u8..7), 7)) {
        let mut state = state_with(&lone_wolf_roles(), 1, 5);
        let mut batch = VoteBatch::new(1);

        for (voter, target) in raw_votes.iter().enumerate() {
            let target = target.map(|t| {
                if t == voter as u8 { (t + 1) % 7 } else { t }
            });
            batch.insert(Vote {
                voter: seat(voter as u8),
                target: target.map(seat),
                round: 1,
            }).unwrap();
        }

        let resolution = Resolver::resolve_vote(&mut state, &batch, TieBreakPolicy::RandomAmongTied).unwrap();
        let VoteResolution::Decided(outcome) = resolution else {
            panic!("RandomAmongTied always decides");
        };
        if let Some(eliminated) = outcome.eliminated {
            let max = outcome.tally.iter().map(|&(_, n)| n).max().unwrap_or(0);
            let count = outcome.tally.iter().find(|&&(id, _)| id == eliminated).map(|&(_, n)| n);
            prop_assert_eq!(count, Some(max));
        }
    }
}
