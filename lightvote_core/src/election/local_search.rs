//! Swap-based approximation of Minimax Approval Voting.

use super::{validate_electorate, ElectionRule};
use crate::ballot::{ApprovalVector, Ballot, Committee};
use crate::error::VotingError;
use tracing::debug;

/// Local search for large `m`, where `C(m, k)` is out of reach.
///
/// Starts from the `k` most-approved alternatives (lower index on ties),
/// then repeatedly applies the single in/out swap that most improves
/// `(worst-case distance, total distance)`. Stops at a local optimum or
/// after `max_rounds` swaps. Deterministic for a given input.
#[derive(Debug, Clone, Copy)]
pub struct LocalSearchMinimax {
    pub max_rounds: usize,
}

impl Default for LocalSearchMinimax {
    fn default() -> Self {
        Self { max_rounds: 1000 }
    }
}

impl LocalSearchMinimax {
    pub fn new(max_rounds: usize) -> Self {
        Self { max_rounds }
    }
}

/// `(max, sum)` of Hamming distances; compared lexicographically.
fn objective(ballots: &[Ballot], candidate: &ApprovalVector) -> (usize, usize) {
    ballots.iter().fold((0, 0), |(max, sum), b| {
        let d = b.approvals().hamming_unchecked(candidate);
        (max.max(d), sum + d)
    })
}

fn seed_committee(ballots: &[Ballot], m: usize, committee_size: usize) -> ApprovalVector {
    let mut order: Vec<(usize, usize)> = (0..m)
        .map(|i| (ballots.iter().filter(|b| b.approves(i)).count(), i))
        .collect();
    // Most approvals first, then lowest index
    order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    
    let mut seed = ApprovalVector::zeros(m);
    for &(_, i) in order.iter().take(committee_size) {
        seed.set(i, true);
    }
    seed
}

impl ElectionRule for LocalSearchMinimax {
    fn elect(&self, ballots: &[Ballot], committee_size: usize) -> Result<Committee, VotingError> {
        let m = validate_electorate(ballots, committee_size)?;
        let mut current = seed_committee(ballots, m, committee_size);
        let mut score = objective(ballots, &current);
        let mut rounds = 0;
        
        while rounds < self.max_rounds {
            let inside: Vec<usize> = current.ones().collect();
            let outside: Vec<usize> = (0..m).filter(|&i| !current.get(i)).collect();
            
            let mut best_swap: Option<((usize, usize), (usize, usize))> = None;
            for &out in &inside {
                for &into in &outside {
                    let mut candidate = current.clone();
                    candidate.set(out, false);
                    candidate.set(into, true);
                    let s = objective(ballots, &candidate);
                    let improves = match best_swap {
                        Some((_, best)) => s < best,
                        None => s < score,
                    };
                    if improves {
                        best_swap = Some(((out, into), s));
                    }
                }
            }
            
            match best_swap {
                Some(((out, into), s)) => {
                    current.set(out, false);
                    current.set(into, true);
                    score = s;
                    rounds += 1;
                }
                None => break,
            }
        }
        
        debug!(
            "local search: n={} m={} k={} worst={} after {} swaps",
            ballots.len(),
            m,
            committee_size,
            score.0,
            rounds
        );
        
        Ok(Committee::from_vector(current))
    }
    
    fn name(&self) -> &str {
        "local_search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::election::{worst_case_distance, MinimaxApproval};
    use proptest::prelude::*;
    
    fn ballots(list: &[&str]) -> Vec<Ballot> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }
    
    #[test]
    fn test_seed_prefers_most_approved() {
        let b = ballots(&["0110", "0100", "0011"]);
        assert_eq!(seed_committee(&b, 4, 2).to_string(), "0110");
    }
    
    #[test]
    fn test_swaps_away_from_majority_seed() {
        // Seed 1100 has worst case 4; one swap reaches the optimum 2
        let b = ballots(&["1100", "1100", "1100", "0011"]);
        let committee = LocalSearchMinimax::default().elect(&b, 2).unwrap();
        
        assert_eq!(committee.size(), 2);
        assert_eq!(worst_case_distance(&b, committee.members()), 2);
    }
    
    #[test]
    fn test_zero_rounds_returns_seed() {
        let b = ballots(&["1100", "1100", "0011"]);
        let committee = LocalSearchMinimax::new(0).elect(&b, 2).unwrap();
        assert_eq!(committee.to_string(), "1100");
    }
    
    #[test]
    fn test_shares_degenerate_input_handling() {
        let rule = LocalSearchMinimax::default();
        assert_eq!(rule.elect(&[], 1), Err(VotingError::EmptyElectorate));
        assert_eq!(
            rule.elect(&ballots(&["10"]), 3),
            Err(VotingError::InvalidCommitteeSize { k: 3, m: 2 })
        );
        assert_eq!(rule.elect(&ballots(&["10"]), 0).unwrap().size(), 0);
    }
    
    proptest! {
        #[test]
        fn prop_never_beats_exact_and_keeps_size(
            rows in prop::collection::vec(prop::collection::vec(any::<bool>(), 6), 1..6),
            k in 0usize..=6,
        ) {
            let b: Vec<Ballot> = rows.iter().map(|r| Ballot::new(ApprovalVector::from_bits(r))).collect();
            let approx = LocalSearchMinimax::default().elect(&b, k).unwrap();
            let exact = MinimaxApproval::new().elect(&b, k).unwrap();
            
            prop_assert_eq!(approx.size(), k);
            prop_assert!(
                worst_case_distance(&b, approx.members()) >= worst_case_distance(&b, exact.members())
            );
        }
    }
}
