//! Common identity types for the LightVote environment abstraction.

use serde::{Deserialize, Serialize};

/// Unique name of a voting agent.
///
/// Names are assumed globally unique; the environment rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentName(pub String);

impl AgentName {
    /// Creates a name from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    
    /// Creates the canonical name for the agent with the given index.
    pub fn indexed(index: u64) -> Self {
        Self(format!("agent-{}", index))
    }
    
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a group.
///
/// Allocated monotonically by the coordination environment, so ordering by
/// id is ordering by creation. Used as the deterministic tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl GroupId {
    /// Returns the raw id.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

/// Unique name of a chair (group coordinator).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChairName(pub String);

impl ChairName {
    /// Creates the chair name for a group opened by `founder`.
    pub fn for_founder(founder: &AgentName, group: GroupId) -> Self {
        Self(format!("chair-{}-{}", founder, group.0))
    }
    
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChairName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
