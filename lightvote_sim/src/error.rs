//! Error types for the simulation harness.

use lightvote_core::VotingError;
use thiserror::Error;

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The voting core rejected an operation
    #[error("Voting error: {0}")]
    Voting(#[from] VotingError),
    
    /// Runtime construction or report I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    /// A scheduled join task panicked or was cancelled
    #[error("Scheduler task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for SimError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
