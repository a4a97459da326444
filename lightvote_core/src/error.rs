//! Error taxonomy for the voting core.

use lightvote_env::{AgentName, GroupId};
use thiserror::Error;

/// Errors raised by ballots, elections and the coordination environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VotingError {
    /// Ballot, committee or preference vector lengths disagree
    #[error("Dimension mismatch: expected {expected} alternatives, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    
    /// An election was invoked without any ballots
    #[error("Election invoked with an empty electorate")]
    EmptyElectorate,
    
    /// Committee size outside `[0, m]`
    #[error("Invalid committee size {k} for {m} alternatives")]
    InvalidCommitteeSize { k: usize, m: usize },
    
    /// The group is full; the caller opens a new group instead
    #[error("Group {0} is at capacity")]
    CapacityExceeded(GroupId),
    
    /// The group is closed and no longer accepts members
    #[error("Group {0} is closed")]
    GroupClosed(GroupId),
    
    /// The agent already went through group formation
    #[error("Agent {0} is already assigned to a group")]
    AlreadyAssigned(AgentName),
    
    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentName),
    
    #[error("Agent name already registered: {0}")]
    DuplicateAgent(AgentName),
    
    #[error("Unknown group: {0}")]
    UnknownGroup(GroupId),
    
    /// Approval vector text was not made of `0`/`1`
    #[error("Invalid bit string: {0:?}")]
    InvalidBitString(String),
    
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VotingError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Fails with `DimensionMismatch` unless `found == expected`.
pub(crate) fn ensure_len(expected: usize, found: usize) -> Result<(), VotingError> {
    if expected == found {
        Ok(())
    } else {
        Err(VotingError::DimensionMismatch { expected, found })
    }
}
