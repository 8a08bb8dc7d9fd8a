//! Win-condition check.

use crate::roles::Faction;

use super::state::GameState;

/// Check whether a faction has won.
///
/// The village wins the moment no wolf is alive; the wolves win the
/// moment they equal or outnumber the living village players. Checked
/// after every elimination, so both conditions can never hold at once.
#[must_use]
pub fn check_victory(state: &GameState) -> Option<Faction> {
    let wolves = state.living_faction_count(Faction::Wolves);
    let villagers = state.living_faction_count(Faction::Village);

    if wolves == 0 {
        Some(Faction::Village)
    } else if wolves >= villagers {
        Some(Faction::Wolves)
    } else {
        None
    }
}
