//! Run-wide election and grouping parameters.

use crate::alternatives::AlternativeSet;
use crate::error::VotingError;
use crate::grouping::GroupingPolicy;
use serde::{Deserialize, Serialize};

/// Default maximum number of members per group.
pub const DEFAULT_CAPACITY: usize = 3;

/// Default Hamming distance above which a coordinated agent opens its own group.
pub const DEFAULT_JOIN_THRESHOLD: usize = 5;

/// Configuration for the coordination environment.
///
/// Validated once at setup; an invalid configuration aborts the run before
/// any agent exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// The `m` alternatives every ballot ranges over
    pub alternatives: AlternativeSet,
    
    /// Committee size `k`, within `[0, m]`
    pub committee_size: usize,
    
    /// Maximum members per group (default: 3)
    pub capacity: usize,
    
    /// Default join threshold for agents created through the environment (default: 5)
    pub join_threshold: usize,
    
    /// Default grouping policy for agents created through the environment
    pub policy: GroupingPolicy,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            alternatives: AlternativeSet::numbered(6),
            committee_size: 2,
            capacity: DEFAULT_CAPACITY,
            join_threshold: DEFAULT_JOIN_THRESHOLD,
            policy: GroupingPolicy::Random,
        }
    }
}

impl ElectionConfig {
    /// Creates a configuration over `m` default-labelled alternatives.
    pub fn with_alternatives(m: usize, committee_size: usize) -> Result<Self, VotingError> {
        let config = Self {
            alternatives: AlternativeSet::with_count(m)?,
            committee_size,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }
    
    /// Sets the group capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
    
    /// Sets the default grouping policy.
    pub fn with_policy(mut self, policy: GroupingPolicy) -> Self {
        self.policy = policy;
        self
    }
    
    /// Sets the default join threshold.
    pub fn with_join_threshold(mut self, threshold: usize) -> Self {
        self.join_threshold = threshold;
        self
    }
    
    /// Number of alternatives `m`.
    pub fn num_alternatives(&self) -> usize {
        self.alternatives.len()
    }
    
    /// Checks the configuration-shaped invariants.
    ///
    /// # Errors
    /// * `InvalidCommitteeSize` - `k > m`
    /// * `InvalidConfig` - zero capacity or no alternatives
    pub fn validate(&self) -> Result<(), VotingError> {
        let m = self.alternatives.len();
        if m == 0 {
            return Err(VotingError::config("no alternatives"));
        }
        if self.committee_size > m {
            return Err(VotingError::InvalidCommitteeSize { k: self.committee_size, m });
        }
        if self.capacity == 0 {
            return Err(VotingError::config("group capacity must be at least 1"));
        }
        Ok(())
    }
}
