//! Phase state machine.

use serde::{Deserialize, Serialize};

/// Game phases in order of progression.
///
/// One round is `Night → Dawn → Day → Vote`; the loop repeats until a
/// faction wins or the round cutoff hits, then the game enters `End`.
/// Games with the night phase disabled (speed variant) go straight from
/// `Setup` to `Day`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Role assignment. No agent interaction.
    #[default]
    Setup,
    /// Night abilities are solicited.
    Night,
    /// Night actions resolve; deaths are announced.
    Dawn,
    /// Public discussion rounds.
    Day,
    /// Simultaneous vote and its resolution.
    Vote,
    /// Terminal. No further solicitation.
    End,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Night => "night",
            Phase::Dawn => "dawn",
            Phase::Day => "day",
            Phase::Vote => "vote",
            Phase::End => "end",
        };
        write!(f, "{name}")
    }
}
