//! Sessions: driving whole games and batches of games.

pub mod batch;
pub mod runner;

pub use batch::{BatchReport, BatchRunner};
pub use runner::{GameRunner, RunnerError};
