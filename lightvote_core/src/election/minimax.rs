//! Exact Minimax Approval Voting.

use super::combinations::{binomial, Combinations};
use super::{validate_electorate, worst_case_distance, ElectionRule};
use crate::ballot::{ApprovalVector, Ballot, Committee};
use crate::error::VotingError;
use tracing::debug;

/// Exhaustive Minimax Approval Voting.
///
/// Enumerates all `C(m, k)` committees in lexicographic order of their
/// index sets and returns the first one with the smallest maximum Hamming
/// distance to any ballot. Ties therefore resolve to the lexicographically
/// smallest committee, e.g. `{0, 1}` before `{0, 2}`.
///
/// The search stops early once a committee reaches the lower bound
/// `max_b | k - |b| |`, which no committee can beat.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimaxApproval;

impl MinimaxApproval {
    pub fn new() -> Self {
        Self
    }
}

/// No size-`k` committee is closer than `| k - |b| |` to ballot `b`.
fn distance_lower_bound(ballots: &[Ballot], committee_size: usize) -> usize {
    ballots
        .iter()
        .map(|b| b.approvals().count_ones().abs_diff(committee_size))
        .max()
        .unwrap_or(0)
}

impl ElectionRule for MinimaxApproval {
    fn elect(&self, ballots: &[Ballot], committee_size: usize) -> Result<Committee, VotingError> {
        let m = validate_electorate(ballots, committee_size)?;
        let bound = distance_lower_bound(ballots, committee_size);
        
        let mut best: Option<(usize, ApprovalVector)> = None;
        let mut evaluated: u64 = 0;
        
        for subset in Combinations::new(m, committee_size) {
            let candidate = ApprovalVector::from_indices(m, &subset)?;
            let worst = worst_case_distance(ballots, &candidate);
            evaluated += 1;
            
            if best.as_ref().map_or(true, |(d, _)| worst < *d) {
                best = Some((worst, candidate));
                if worst == bound {
                    break;
                }
            }
        }
        
        debug!(
            "minimax: n={} m={} k={} evaluated {}/{} committees",
            ballots.len(),
            m,
            committee_size,
            evaluated,
            binomial(m, committee_size)
        );
        
        best.map(|(_, members)| Committee::from_vector(members))
            .ok_or(VotingError::InvalidCommitteeSize { k: committee_size, m })
    }
    
    fn name(&self) -> &str {
        "minimax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    
    fn ballots(list: &[&str]) -> Vec<Ballot> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }
    
    /// Worst-case distance of every size-k committee, no shortcuts.
    fn brute_force_optimum(ballots: &[Ballot], k: usize) -> usize {
        let m = ballots[0].len();
        Combinations::new(m, k)
            .map(|s| worst_case_distance(ballots, &ApprovalVector::from_indices(m, &s).unwrap()))
            .min()
            .unwrap()
    }
    
    #[test]
    fn test_four_alternatives_three_ballots() {
        // All six 2-committees: 1100, 1010, 0110 -> worst 2; 1001, 0101, 0011 -> worst 4
        let b = ballots(&["1100", "1010", "0110"]);
        let committee = MinimaxApproval::new().elect(&b, 2).unwrap();
        
        assert_eq!(committee.to_string(), "1100");
        assert_eq!(worst_case_distance(&b, committee.members()), 2);
    }
    
    #[test]
    fn test_tie_break_is_lexicographic() {
        // {2} and {3} both reach worst case 1; the smaller index wins
        let b = ballots(&["0011", "0000"]);
        let committee = MinimaxApproval::new().elect(&b, 1).unwrap();
        assert_eq!(committee.elected(), vec![2]);
        
        let b = ballots(&["000", "000"]);
        let committee = MinimaxApproval::new().elect(&b, 1).unwrap();
        assert_eq!(committee.to_string(), "100");
    }
    
    #[test]
    fn test_unanimous_ballots_elect_themselves() {
        let b = ballots(&["010110", "010110", "010110"]);
        let committee = MinimaxApproval::new().elect(&b, 3).unwrap();
        assert_eq!(committee.to_string(), "010110");
    }
    
    #[test]
    fn test_minimax_differs_from_approval_count() {
        // The two most-approved alternatives leave the last voter at distance 4
        let b = ballots(&["1100", "1100", "1100", "0011"]);
        let committee = MinimaxApproval::new().elect(&b, 2).unwrap();
        assert_eq!(worst_case_distance(&b, committee.members()), 2);
        assert_eq!(committee.to_string(), "1010");
    }
    
    #[test]
    fn test_degenerate_inputs() {
        let rule = MinimaxApproval::new();
        
        assert_eq!(rule.elect(&[], 2), Err(VotingError::EmptyElectorate));
        assert_eq!(
            rule.elect(&ballots(&["101"]), 4),
            Err(VotingError::InvalidCommitteeSize { k: 4, m: 3 })
        );
        
        let empty = rule.elect(&ballots(&["101", "011"]), 0).unwrap();
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.len(), 3);
        
        let full = rule.elect(&ballots(&["101", "011"]), 3).unwrap();
        assert_eq!(full.to_string(), "111");
    }
    
    #[test]
    fn test_lower_bound() {
        let b = ballots(&["1110", "1000"]);
        assert_eq!(distance_lower_bound(&b, 2), 1);
        assert_eq!(distance_lower_bound(&b, 4), 3);
    }
    
    fn electorate() -> impl Strategy<Value = (Vec<Ballot>, usize)> {
        (1usize..=8).prop_flat_map(|m| {
            (
                prop::collection::vec(prop::collection::vec(any::<bool>(), m), 1..6),
                0..=m,
            )
        })
        .prop_map(|(rows, k)| {
            let ballots = rows
                .iter()
                .map(|bits| Ballot::new(ApprovalVector::from_bits(bits)))
                .collect();
            (ballots, k)
        })
    }
    
    proptest! {
        #[test]
        fn prop_committee_has_exactly_k_members((b, k) in electorate()) {
            let committee = MinimaxApproval::new().elect(&b, k).unwrap();
            prop_assert_eq!(committee.size(), k);
            prop_assert_eq!(committee.len(), b[0].len());
        }
        
        #[test]
        fn prop_no_committee_has_smaller_worst_case((b, k) in electorate()) {
            let committee = MinimaxApproval::new().elect(&b, k).unwrap();
            prop_assert_eq!(worst_case_distance(&b, committee.members()), brute_force_optimum(&b, k));
        }
    }
}
