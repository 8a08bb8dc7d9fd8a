//! Agents: decision-makers behind each seat.

pub mod random;
pub mod scripted;
pub mod traits;

pub use random::RandomAgent;
pub use scripted::ScriptedAgent;
pub use traits::{Agent, AgentError};
