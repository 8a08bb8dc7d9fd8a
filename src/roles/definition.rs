//! Role definitions: the closed set of roles and their capabilities.
//!
//! Roles are a fixed enum rather than an open registry of definitions:
//! the capability table is part of the rules under test, and a
//! misspelled role name must be unrepresentable rather than a runtime
//! error.

use serde::{Deserialize, Serialize};

/// The team a role belongs to, which determines its win condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Wolves,
    Village,
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Wolves => write!(f, "wolves"),
            Faction::Village => write!(f, "village"),
        }
    }
}

/// A night ability a role may exercise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Learn the target's role. Informational only, never affects other
    /// actions in the same round.
    Inspect,
    /// Shield the target from kills this round.
    Protect,
    /// Kill the target unless it is protected this round.
    Kill,
}

impl AbilityKind {
    /// Fixed resolution order: inspections first, protections second,
    /// kills last. Never dependent on seat order.
    #[must_use]
    pub const fn resolution_order(self) -> u8 {
        match self {
            AbilityKind::Inspect => 0,
            AbilityKind::Protect => 1,
            AbilityKind::Kill => 2,
        }
    }

    /// Whether the actor may target itself.
    #[must_use]
    pub const fn allows_self_target(self) -> bool {
        // Doctors may guard themselves; inspecting or killing yourself
        // is pointless and therefore illegal.
        matches!(self, AbilityKind::Protect)
    }
}

/// Static capabilities of a role. Every night ability is usable every
/// night round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleSpec {
    pub role: Role,
    pub faction: Faction,
    pub night_ability: Option<AbilityKind>,
}

/// The roles in play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Wolves kill one player per night, chosen by pack consensus.
    Werewolf,
    /// The seer inspects one player per night and learns its role.
    Seer,
    /// The doctor protects one player per night from being killed.
    Doctor,
    /// No night ability; discussion and voting only.
    Villager,
}

impl Role {
    const SPECS: [RoleSpec; 4] = [
        RoleSpec {
            role: Role::Werewolf,
            faction: Faction::Wolves,
            night_ability: Some(AbilityKind::Kill),
        },
        RoleSpec {
            role: Role::Seer,
            faction: Faction::Village,
            night_ability: Some(AbilityKind::Inspect),
        },
        RoleSpec {
            role: Role::Doctor,
            faction: Faction::Village,
            night_ability: Some(AbilityKind::Protect),
        },
        RoleSpec {
            role: Role::Villager,
            faction: Faction::Village,
            night_ability: None,
        },
    ];

    /// Static capability record for this role.
    ///
    /// `SPECS` is indexed by variant order.
    #[must_use]
    pub const fn spec(self) -> &'static RoleSpec {
        &Self::SPECS[self as usize]
    }

    /// The faction this role wins with.
    #[must_use]
    pub fn faction(self) -> Faction {
        self.spec().faction
    }

    /// The role's night ability, if any.
    #[must_use]
    pub fn night_ability(self) -> Option<AbilityKind> {
        self.spec().night_ability
    }

    /// All role variants.
    #[must_use]
    pub const fn all() -> [Role; 4] {
        [Role::Werewolf, Role::Seer, Role::Doctor, Role::Villager]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Werewolf => write!(f, "werewolf"),
            Role::Seer => write!(f, "seer"),
            Role::Doctor => write!(f, "doctor"),
            Role::Villager => write!(f, "villager"),
        }
    }
}
