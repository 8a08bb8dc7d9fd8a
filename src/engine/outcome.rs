//! Resolution outcomes and the per-game record.
//!
//! Everything the resolver and moderator produce is recorded here in a
//! serializable form, so a finished game can be replayed, audited, or
//! aggregated across a batch without re-running it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;
use crate::roles::{Faction, Role};

use super::action::{DeclaredAction, Vote};
use super::phase::Phase;

/// A private role reveal delivered to the seer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub seer: PlayerId,
    pub target: PlayerId,
    pub role: Role,
    pub round: u32,
}

/// Where a speech is audible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Visible to all players.
    Public,
    /// Visible to wolves only.
    Wolf,
}

/// One utterance during discussion or wolf chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub speaker: PlayerId,
    pub round: u32,
    pub channel: Channel,
    pub text: String,
}

/// The result of resolving one night.
///
/// `deaths` is what gets announced at dawn; `protected`, `saved`, and
/// `inspections` stay out of the public announcement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightOutcome {
    pub round: u32,
    /// Players killed this night, id-sorted.
    pub deaths: SmallVec<[PlayerId; 2]>,
    /// Every player guarded this night, id-sorted. More than one entry
    /// when the configuration fields multiple doctors.
    pub protected: Vec<PlayerId>,
    /// Set when the wolf kill landed on the protected player. The
    /// target is never told who it was.
    pub saved: bool,
    pub inspections: Vec<Inspection>,
}

/// The result of resolving one vote pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub round: u32,
    /// Vote counts per target, id-sorted. Abstentions are not tallied.
    pub tally: Vec<(PlayerId, u32)>,
    pub eliminated: Option<PlayerId>,
    /// Whether the top of the tally was tied before tie-break.
    pub tie: bool,
    /// Whether this outcome came from the second pass of a re-vote.
    pub revoted: bool,
}

/// Why an agent's answer was discarded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// No answer within the per-call deadline.
    Timeout,
    /// The answer was not in the legal set offered.
    InvalidChoice,
    /// The agent returned an error.
    Failure(String),
}

/// What the moderator substituted for the discarded answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackApplied {
    /// A uniformly random legal choice.
    RandomLegal,
    /// An abstention (votes only).
    Abstained,
    /// The speech turn was skipped.
    SpeechSkipped,
}

/// One agent failure and the substitution that kept the game going.
///
/// A fault never stops the game; it is recorded so a batch can report
/// how often each agent had to be overridden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFault {
    pub player: PlayerId,
    pub round: u32,
    pub phase: Phase,
    pub kind: FaultKind,
    pub fallback: FallbackApplied,
}

/// Everything that happened in one round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    /// Night declarations in actor-id order. Empty when night is
    /// disabled or the game ended before night.
    pub night_actions: Vec<DeclaredAction>,
    pub night: Option<NightOutcome>,
    /// Public discussion in speaking order.
    pub speeches: Vec<Speech>,
    /// Wolf chat in speaking order.
    pub wolf_chat: Vec<Speech>,
    /// Votes in voter-id order, both passes when a re-vote ran.
    pub votes: Vec<Vote>,
    pub vote: Option<VoteOutcome>,
    pub faults: Vec<AgentFault>,
}

impl RoundRecord {
    #[must_use]
    pub fn new(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }
}

/// A player's final line in the game record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    pub eliminated_round: Option<u32>,
}

/// How a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// All wolves are dead.
    VillageWin,
    /// Living wolves equal or outnumber living villagers.
    WolvesWin,
    /// The round cutoff was reached with both factions alive. Neither
    /// side wins.
    Cutoff,
}

impl Verdict {
    /// The winning faction, if any.
    #[must_use]
    pub fn winner(self) -> Option<Faction> {
        match self {
            Verdict::VillageWin => Some(Faction::Village),
            Verdict::WolvesWin => Some(Faction::Wolves),
            Verdict::Cutoff => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::VillageWin => write!(f, "village wins"),
            Verdict::WolvesWin => write!(f, "wolves win"),
            Verdict::Cutoff => write!(f, "cutoff"),
        }
    }
}

/// The full record of a finished game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub roster: Vec<RosterEntry>,
    pub rounds: Vec<RoundRecord>,
    pub verdict: Verdict,
}

impl GameRecord {
    /// Number of rounds played, including a final partial round.
    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Total agent faults across all rounds.
    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.rounds.iter().map(|r| r.faults.len()).sum()
    }
}
