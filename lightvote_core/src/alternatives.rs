//! The ordered set of alternatives up for election.

use crate::ballot::ApprovalVector;
use crate::error::VotingError;
use serde::{Deserialize, Serialize};

/// Ordered, indexable alternatives. Position is identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSet {
    labels: Vec<String>,
}

impl AlternativeSet {
    /// Creates a set from explicit labels.
    ///
    /// Labels must be non-empty as a list and pairwise distinct.
    pub fn new(labels: Vec<String>) -> Result<Self, VotingError> {
        if labels.is_empty() {
            return Err(VotingError::config("alternative set is empty"));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(VotingError::config(format!("duplicate alternative {:?}", label)));
            }
        }
        Ok(Self { labels })
    }
    
    /// Creates `m` alternatives labelled `a0 .. a{m-1}`.
    pub fn with_count(m: usize) -> Result<Self, VotingError> {
        if m == 0 {
            return Err(VotingError::config("alternative set is empty"));
        }
        Ok(Self::numbered(m))
    }
    
    /// Default labels are distinct by construction.
    pub(crate) fn numbered(m: usize) -> Self {
        Self {
            labels: (0..m).map(|i| format!("a{}", i)).collect(),
        }
    }
    
    /// Number of alternatives `m`.
    pub fn len(&self) -> usize {
        self.labels.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
    
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
    
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
    
    /// Labels of the alternatives set in `v`.
    pub fn describe(&self, v: &ApprovalVector) -> Vec<&str> {
        v.ones().filter_map(|i| self.label(i)).collect()
    }
}
