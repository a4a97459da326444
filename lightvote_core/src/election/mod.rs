//! Committee election rules.
//!
//! Every rule maps a closed group's ballots and a committee size `k` to a
//! committee of exactly `k` alternatives. Rules are pluggable: the grouping
//! protocol and the scorer only ever see `dyn ElectionRule`.
//!
//! - `MinimaxApproval`: exact Minimax Approval Voting (exhaustive, exponential in `m`)
//! - `LocalSearchMinimax`: swap-based approximation for larger `m`

mod combinations;
mod minimax;
mod local_search;

pub use combinations::{binomial, Combinations};
pub use minimax::MinimaxApproval;
pub use local_search::LocalSearchMinimax;

use crate::ballot::{ApprovalVector, Ballot, Committee};
use crate::error::{ensure_len, VotingError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An election rule over approval ballots.
pub trait ElectionRule: Send + Sync {
    /// Elects a committee of exactly `committee_size` alternatives.
    ///
    /// # Errors
    /// * `EmptyElectorate` - no ballots
    /// * `DimensionMismatch` - ballots of different lengths
    /// * `InvalidCommitteeSize` - `committee_size > m`
    fn elect(&self, ballots: &[Ballot], committee_size: usize) -> Result<Committee, VotingError>;
    
    /// Returns the name of this rule.
    fn name(&self) -> &str;
}

/// A committee together with how well it serves the worst-off voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionOutcome {
    pub committee: Committee,
    
    /// Maximum Hamming distance from any ballot to the committee
    pub worst_case: usize,
    
    /// Name of the rule that produced the committee
    pub rule: String,
}

impl ElectionOutcome {
    /// Runs `rule` and measures the result against the same ballots.
    pub fn elect(
        rule: &dyn ElectionRule,
        ballots: &[Ballot],
        committee_size: usize,
    ) -> Result<Self, VotingError> {
        let committee = rule.elect(ballots, committee_size)?;
        let worst_case = worst_case_distance(ballots, committee.members());
        Ok(Self {
            committee,
            worst_case,
            rule: rule.name().to_string(),
        })
    }
}

/// Maximum Hamming distance between `candidate` and any ballot; 0 without ballots.
///
/// Ballots must already match `candidate` in length.
pub fn worst_case_distance(ballots: &[Ballot], candidate: &ApprovalVector) -> usize {
    ballots
        .iter()
        .map(|b| b.approvals().hamming_unchecked(candidate))
        .max()
        .unwrap_or(0)
}

/// Checks the shared preconditions of every rule and returns `m`.
pub(crate) fn validate_electorate(ballots: &[Ballot], committee_size: usize) -> Result<usize, VotingError> {
    let first = ballots.first().ok_or(VotingError::EmptyElectorate)?;
    let m = first.len();
    for ballot in ballots {
        ensure_len(m, ballot.len())?;
    }
    if committee_size > m {
        return Err(VotingError::InvalidCommitteeSize { k: committee_size, m });
    }
    Ok(m)
}

/// Selectable rule implementations (for configuration and the CLI).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Exact Minimax Approval Voting
    #[default]
    Minimax,
    
    /// Local-search approximation of Minimax Approval Voting
    LocalSearch,
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Minimax => "minimax",
            RuleKind::LocalSearch => "local_search",
        }
    }
    
    /// Instantiates the rule with default parameters.
    pub fn build(&self) -> Arc<dyn ElectionRule> {
        match self {
            RuleKind::Minimax => Arc::new(MinimaxApproval::new()),
            RuleKind::LocalSearch => Arc::new(LocalSearchMinimax::default()),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for RuleKind {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimax" | "mav" | "exact" => Ok(RuleKind::Minimax),
            "local_search" | "localsearch" | "approx" => Ok(RuleKind::LocalSearch),
            _ => Err(format!("Unknown election rule: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn ballots(list: &[&str]) -> Vec<Ballot> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }
    
    #[test]
    fn test_validate_electorate() {
        assert_eq!(validate_electorate(&ballots(&["1100", "0011"]), 2), Ok(4));
        assert_eq!(validate_electorate(&[], 1), Err(VotingError::EmptyElectorate));
        assert_eq!(
            validate_electorate(&ballots(&["1100", "001"]), 1),
            Err(VotingError::DimensionMismatch { expected: 4, found: 3 })
        );
        assert_eq!(
            validate_electorate(&ballots(&["1100"]), 5),
            Err(VotingError::InvalidCommitteeSize { k: 5, m: 4 })
        );
    }
    
    #[test]
    fn test_worst_case_distance() {
        let b = ballots(&["1100", "1010", "0110"]);
        let c: ApprovalVector = "1100".parse().unwrap();
        assert_eq!(worst_case_distance(&b, &c), 2);
        assert_eq!(worst_case_distance(&[], &c), 0);
    }
    
    #[test]
    fn test_outcome_records_rule_and_worst_case() {
        let b = ballots(&["1100", "1010", "0110"]);
        let outcome = ElectionOutcome::elect(&MinimaxApproval::new(), &b, 2).unwrap();
        assert_eq!(outcome.committee.to_string(), "1100");
        assert_eq!(outcome.worst_case, 2);
        assert_eq!(outcome.rule, "minimax");
    }
    
    #[test]
    fn test_rule_kind_parse_and_build() {
        assert_eq!("MAV".parse::<RuleKind>(), Ok(RuleKind::Minimax));
        assert_eq!("local_search".parse::<RuleKind>(), Ok(RuleKind::LocalSearch));
        assert!("borda".parse::<RuleKind>().is_err());
        
        assert_eq!(RuleKind::LocalSearch.build().name(), "local_search");
        assert_eq!(RuleKind::default(), RuleKind::Minimax);
    }
}
