//! Legality queries: which actions a player may declare right now.
//!
//! Pure lookups over the capability table and the current roster. The
//! moderator uses these to build the legal-action set offered to each
//! agent and to validate whatever the agent returns; the resolver never
//! sees a declaration that was not drawn from one of these sets.

use crate::core::PlayerId;
use crate::engine::state::GameState;

use super::definition::AbilityKind;

/// A night ability together with the targets currently legal for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegalNightAction {
    pub kind: AbilityKind,
    pub targets: Vec<PlayerId>,
}

/// Stateless legality lookup over the role capability table.
pub struct RoleRegistry;

impl RoleRegistry {
    /// Living players whose role has a night ability, in seat order.
    ///
    /// Seat order here is a solicitation order only; resolution is
    /// order-insensitive.
    #[must_use]
    pub fn night_eligible(state: &GameState) -> Vec<PlayerId> {
        state
            .living_players()
            .filter(|p| p.role.night_ability().is_some())
            .map(|p| p.id)
            .collect()
    }

    /// The night action `actor` may legally declare, with its valid
    /// targets. `None` if the actor is dead or has no night ability.
    #[must_use]
    pub fn legal_night_action(state: &GameState, actor: PlayerId) -> Option<LegalNightAction> {
        let player = state.player(actor)?;
        if !player.alive {
            return None;
        }
        let kind = player.role.night_ability()?;

        let targets = state
            .living_players()
            .filter(|p| p.id != actor || kind.allows_self_target())
            .map(|p| p.id)
            .collect();

        Some(LegalNightAction { kind, targets })
    }

    /// Legal vote targets for `voter`: every living player except the
    /// voter itself. Empty if the voter is dead.
    #[must_use]
    pub fn vote_candidates(state: &GameState, voter: PlayerId) -> Vec<PlayerId> {
        match state.player(voter) {
            Some(p) if p.alive => state
                .living_players()
                .filter(|p| p.id != voter)
                .map(|p| p.id)
                .collect(),
            _ => Vec::new(),
        }
    }
}
