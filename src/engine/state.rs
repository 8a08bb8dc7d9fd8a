//! Game state: roster, phase, and the append-only round history.
//!
//! `GameState` is the single source of truth the resolver mutates and
//! the moderator reads. Agents never see it directly; each gets a
//! [`PlayerView`] filtered down to what that seat is entitled to know.
//! Hidden state (other players' roles, the seer's reveals, wolf chat)
//! stays behind the view boundary so an agent cannot cheat even by
//! accident.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, GameConfig, GameRng, PlayerId};
use crate::roles::{Faction, Role};

use super::outcome::{Channel, Inspection, RosterEntry, RoundRecord, Speech};
use super::phase::Phase;

/// One seat in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    pub eliminated_round: Option<u32>,
}

/// Authoritative state of one running game.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Current round, starting at 1. Round 0 is setup.
    pub round: u32,
    pub phase: Phase,
    players: Vec<Player>,
    /// Completed round records. Persistent so snapshots for replay or
    /// debugging share structure instead of deep-copying.
    history: Vector<RoundRecord>,
    reveals: Vec<Inspection>,
    speeches: Vec<Speech>,
    wolf_chat: Vec<Speech>,
    rng: GameRng,
}

impl GameState {
    /// Build the initial state from a validated configuration.
    ///
    /// Roles are shuffled onto seats with a dedicated RNG stream, so
    /// the assignment depends only on the seed and the distribution.
    pub fn setup(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut deck: Vec<Role> = config
            .roles
            .iter()
            .flat_map(|rc| std::iter::repeat(rc.role).take(rc.count))
            .collect();

        let rng = GameRng::new(config.seed);
        rng.for_context("roles").shuffle(&mut deck);

        let players = deck
            .into_iter()
            .enumerate()
            .map(|(seat, role)| Player {
                id: PlayerId::new(seat as u8),
                name: config.display_name(seat),
                role,
                alive: true,
                eliminated_round: None,
            })
            .collect();

        Ok(Self {
            round: 0,
            phase: Phase::Setup,
            players,
            history: Vector::new(),
            reveals: Vec::new(),
            speeches: Vec::new(),
            wolf_chat: Vec::new(),
            rng,
        })
    }

    /// Build a state with roles assigned in seat order, no shuffle.
    ///
    /// For tests and scripted setups where the scenario needs to know
    /// which seat holds which role.
    #[must_use]
    pub fn with_roles(roles: &[Role], seed: u64) -> Self {
        let players = roles
            .iter()
            .enumerate()
            .map(|(seat, &role)| Player {
                id: PlayerId::new(seat as u8),
                name: format!("Player {seat}"),
                role,
                alive: true,
                eliminated_round: None,
            })
            .collect();

        Self {
            round: 0,
            phase: Phase::Setup,
            players,
            history: Vector::new(),
            reveals: Vec::new(),
            speeches: Vec::new(),
            wolf_chat: Vec::new(),
            rng: GameRng::new(seed),
        }
    }

    // === Roster queries ===

    /// Total seats, dead or alive.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Look up a seat.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    /// All seats in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Living seats in id order.
    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    /// Ids of living seats.
    #[must_use]
    pub fn living_ids(&self) -> Vec<PlayerId> {
        self.living_players().map(|p| p.id).collect()
    }

    /// Living wolves.
    #[must_use]
    pub fn living_wolves(&self) -> Vec<PlayerId> {
        self.living_players()
            .filter(|p| p.role.faction() == Faction::Wolves)
            .map(|p| p.id)
            .collect()
    }

    /// Count of living players on a faction.
    #[must_use]
    pub fn living_faction_count(&self, faction: Faction) -> usize {
        self.living_players()
            .filter(|p| p.role.faction() == faction)
            .count()
    }

    /// The final roster for the game record.
    #[must_use]
    pub fn roster(&self) -> Vec<RosterEntry> {
        self.players
            .iter()
            .map(|p| RosterEntry {
                id: p.id,
                name: p.name.clone(),
                role: p.role,
                alive: p.alive,
                eliminated_round: p.eliminated_round,
            })
            .collect()
    }

    // === Mutation ===

    /// Kill a seat. Idempotent: a second death in the same game keeps
    /// the original elimination round.
    pub fn mark_dead(&mut self, id: PlayerId, round: u32) {
        if let Some(player) = self.players.get_mut(id.index()) {
            if player.alive {
                player.alive = false;
                player.eliminated_round = Some(round);
            }
        }
    }

    /// Record a speech on its channel.
    pub fn record_speech(&mut self, speech: Speech) {
        match speech.channel {
            Channel::Public => self.speeches.push(speech),
            Channel::Wolf => self.wolf_chat.push(speech),
        }
    }

    /// Deliver inspection results to the seer's private knowledge.
    pub fn record_inspections(&mut self, inspections: &[Inspection]) {
        self.reveals.extend_from_slice(inspections);
    }

    /// Append a completed round record.
    pub fn push_record(&mut self, record: RoundRecord) {
        self.history.push_back(record);
    }

    /// Completed round records.
    #[must_use]
    pub fn history(&self) -> &Vector<RoundRecord> {
        &self.history
    }

    /// The game's RNG root, for deriving context streams.
    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    // === Views ===

    /// The filtered view offered to one seat. `None` for an id with no
    /// seat.
    ///
    /// A wolf sees its living packmates and the wolf chat; the seer
    /// sees its own reveals; everyone sees the public roster (names and
    /// alive flags, never roles) and the public speeches.
    #[must_use]
    pub fn view(&self, id: PlayerId) -> Option<PlayerView> {
        let me = self.player(id)?;
        let is_wolf = me.role.faction() == Faction::Wolves;

        let allies = if is_wolf {
            self.living_wolves().into_iter().filter(|&w| w != id).collect()
        } else {
            Vec::new()
        };

        Some(PlayerView {
            round: self.round,
            phase: self.phase,
            me: id,
            name: me.name.clone(),
            role: me.role,
            faction: me.role.faction(),
            roster: self
                .players
                .iter()
                .map(|p| SeatInfo {
                    id: p.id,
                    name: p.name.clone(),
                    alive: p.alive,
                })
                .collect(),
            allies,
            reveals: self
                .reveals
                .iter()
                .filter(|r| r.seer == id)
                .copied()
                .collect(),
            speeches: self.speeches.clone(),
            wolf_chat: if is_wolf {
                self.wolf_chat.clone()
            } else {
                Vec::new()
            },
        })
    }
}

/// Public facts about a seat: never includes the role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}

/// What one seat is allowed to know.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerView {
    pub round: u32,
    pub phase: Phase,
    pub me: PlayerId,
    pub name: String,
    /// The viewer's own role. Other roles never appear in a view.
    pub role: Role,
    pub faction: Faction,
    pub roster: Vec<SeatInfo>,
    /// Living fellow wolves. Empty for village seats.
    pub allies: Vec<PlayerId>,
    /// The viewer's own inspection results. Empty for non-seers.
    pub reveals: Vec<Inspection>,
    /// Public discussion so far, in speaking order.
    pub speeches: Vec<Speech>,
    /// Wolf chat so far. Empty for village seats.
    pub wolf_chat: Vec<Speech>,
}

impl PlayerView {
    /// Living seats other than the viewer.
    #[must_use]
    pub fn living_others(&self) -> Vec<PlayerId> {
        self.roster
            .iter()
            .filter(|s| s.alive && s.id != self.me)
            .map(|s| s.id)
            .collect()
    }

    /// Display name for a seat, if it exists.
    #[must_use]
    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        self.roster
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_state() -> GameState {
        GameState::with_roles(
            &[
                Role::Werewolf,
                Role::Werewolf,
                Role::Seer,
                Role::Doctor,
                Role::Villager,
                Role::Villager,
                Role::Villager,
            ],
            42,
        )
    }

    #[test]
    fn test_setup_assigns_all_roles() {
        let config = GameConfig::classic(42);
        let state = GameState::setup(&config).unwrap();

        assert_eq!(state.player_count(), 7);
        assert_eq!(
            state.players().filter(|p| p.role == Role::Werewolf).count(),
            2
        );
        assert_eq!(state.players().filter(|p| p.role == Role::Seer).count(), 1);
        assert!(state.players().all(|p| p.alive));
        assert_eq!(state.phase, Phase::Setup);
    }

    #[test]
    fn test_setup_is_deterministic() {
        let config = GameConfig::classic(42);
        let a = GameState::setup(&config).unwrap();
        let b = GameState::setup(&config).unwrap();

        let roles_a: Vec<_> = a.players().map(|p| p.role).collect();
        let roles_b: Vec<_> = b.players().map(|p| p.role).collect();
        assert_eq!(roles_a, roles_b);
    }

    #[test]
    fn test_setup_rejects_invalid_config() {
        let config = GameConfig::new(7, 1);
        assert!(GameState::setup(&config).is_err());
    }

    #[test]
    fn test_mark_dead_is_idempotent() {
        let mut state = classic_state();
        state.mark_dead(PlayerId::new(4), 1);
        state.mark_dead(PlayerId::new(4), 3);

        let player = state.player(PlayerId::new(4)).unwrap();
        assert!(!player.alive);
        assert_eq!(player.eliminated_round, Some(1));
    }

    #[test]
    fn test_living_queries() {
        let mut state = classic_state();
        state.mark_dead(PlayerId::new(0), 1);
        state.mark_dead(PlayerId::new(4), 1);

        assert_eq!(state.living_ids().len(), 5);
        assert_eq!(state.living_wolves(), vec![PlayerId::new(1)]);
        assert_eq!(state.living_faction_count(Faction::Village), 4);
    }

    #[test]
    fn test_view_hides_other_roles() {
        let state = classic_state();
        let view = state.view(PlayerId::new(4)).unwrap();

        assert_eq!(view.role, Role::Villager);
        assert_eq!(view.roster.len(), 7);
        // SeatInfo carries no role field; nothing further to hide.
        assert!(view.allies.is_empty());
        assert!(view.wolf_chat.is_empty());
        assert!(view.reveals.is_empty());
    }

    #[test]
    fn test_wolf_view_sees_living_allies() {
        let mut state = classic_state();
        let view = state.view(PlayerId::new(0)).unwrap();
        assert_eq!(view.allies, vec![PlayerId::new(1)]);

        state.mark_dead(PlayerId::new(1), 1);
        let view = state.view(PlayerId::new(0)).unwrap();
        assert!(view.allies.is_empty());
    }

    #[test]
    fn test_seer_view_sees_only_own_reveals() {
        let mut state = classic_state();
        state.record_inspections(&[Inspection {
            seer: PlayerId::new(2),
            target: PlayerId::new(0),
            role: Role::Werewolf,
            round: 1,
        }]);

        let seer_view = state.view(PlayerId::new(2)).unwrap();
        assert_eq!(seer_view.reveals.len(), 1);
        assert_eq!(seer_view.reveals[0].role, Role::Werewolf);

        let other_view = state.view(PlayerId::new(4)).unwrap();
        assert!(other_view.reveals.is_empty());
    }

    #[test]
    fn test_wolf_chat_visible_to_wolves_only() {
        let mut state = classic_state();
        state.record_speech(Speech {
            speaker: PlayerId::new(0),
            round: 1,
            channel: Channel::Wolf,
            text: "target the quiet one".into(),
        });

        assert_eq!(state.view(PlayerId::new(1)).unwrap().wolf_chat.len(), 1);
        assert!(state.view(PlayerId::new(2)).unwrap().wolf_chat.is_empty());
    }

    #[test]
    fn test_public_speech_visible_to_all() {
        let mut state = classic_state();
        state.record_speech(Speech {
            speaker: PlayerId::new(3),
            round: 1,
            channel: Channel::Public,
            text: "I have nothing to hide".into(),
        });

        assert_eq!(state.view(PlayerId::new(0)).unwrap().speeches.len(), 1);
        assert_eq!(state.view(PlayerId::new(6)).unwrap().speeches.len(), 1);
    }

    #[test]
    fn test_view_living_others() {
        let mut state = classic_state();
        state.mark_dead(PlayerId::new(5), 1);

        let others = state.view(PlayerId::new(0)).unwrap().living_others();
        assert_eq!(others.len(), 5);
        assert!(!others.contains(&PlayerId::new(0)));
        assert!(!others.contains(&PlayerId::new(5)));
    }

    #[test]
    fn test_view_of_unknown_seat_is_none() {
        let state = classic_state();
        assert!(state.view(PlayerId::new(99)).is_none());
        assert!(state.view(PlayerId::new(7)).is_none());
    }

    #[test]
    fn test_history_push() {
        let mut state = classic_state();
        state.push_record(RoundRecord::new(1));
        state.push_record(RoundRecord::new(2));
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[1].round, 2);
    }
}
