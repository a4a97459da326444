//! Group formation: deciding where an unassigned agent goes.
//!
//! These functions only decide. Admission itself (the atomic
//! check-and-append) happens in `Group` under the group's own lock, and the
//! environment turns a rejected admission into "open a new group".

use crate::ballot::{ApprovalVector, Ballot};
use crate::error::VotingError;
use lightvote_env::GroupId;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Strategy by which an agent picks a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingPolicy {
    /// Uniformly random open group
    #[default]
    Random,
    
    /// Closest open group by ballot distance, within the agent's threshold
    Coordinated,
}

impl GroupingPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            GroupingPolicy::Random => "random",
            GroupingPolicy::Coordinated => "coordinated",
        }
    }
}

impl std::fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for GroupingPolicy {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(GroupingPolicy::Random),
            "coordinated" => Ok(GroupingPolicy::Coordinated),
            _ => Err(format!("Unknown grouping policy: {}", s)),
        }
    }
}

/// Where an agent should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Try to join this open group
    Join(GroupId),
    
    /// Found a new group
    Open,
}

/// Random policy: any open group, uniformly; open a new one if there is none.
pub fn place_random<R: Rng + ?Sized>(open: &[GroupId], rng: &mut R) -> Placement {
    match open.choose(rng) {
        Some(&id) => Placement::Join(id),
        None => Placement::Open,
    }
}

/// Candidate groups ordered by distance from `ballot` to their proxy,
/// closest first, lowest group id among equals.
pub fn rank_by_distance(
    ballot: &Ballot,
    candidates: &[(GroupId, ApprovalVector)],
) -> Result<Vec<(GroupId, usize)>, VotingError> {
    let mut ranked = candidates
        .iter()
        .map(|(id, proxy)| ballot.distance(proxy).map(|d| (*id, d)))
        .collect::<Result<Vec<_>, _>>()?;
    ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    Ok(ranked)
}

/// Coordinated policy: join the closest open group unless even that one is
/// farther than `threshold`.
pub fn place_coordinated(
    ballot: &Ballot,
    candidates: &[(GroupId, ApprovalVector)],
    threshold: usize,
) -> Result<Placement, VotingError> {
    let ranked = rank_by_distance(ballot, candidates)?;
    Ok(match ranked.first() {
        Some(&(id, distance)) if distance <= threshold => Placement::Join(id),
        _ => Placement::Open,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    
    fn v(s: &str) -> ApprovalVector {
        s.parse().unwrap()
    }
    
    fn b(s: &str) -> Ballot {
        s.parse().unwrap()
    }
    
    #[test]
    fn test_random_opens_when_nothing_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(place_random(&[], &mut rng), Placement::Open);
    }
    
    #[test]
    fn test_random_picks_among_open_groups() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let open = [GroupId(0), GroupId(3), GroupId(7)];
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            match place_random(&open, &mut rng) {
                Placement::Join(id) => {
                    assert!(open.contains(&id));
                    seen.insert(id);
                }
                Placement::Open => panic!("open groups exist"),
            }
        }
        assert_eq!(seen.len(), 3);
    }
    
    #[test]
    fn test_ranking_ascending_with_id_tie_break() {
        let candidates = vec![
            (GroupId(4), v("0000")),
            (GroupId(2), v("1111")),
            (GroupId(1), v("0011")),
            (GroupId(3), v("1100")),
        ];
        let ranked = rank_by_distance(&b("1100"), &candidates).unwrap();
        
        assert_eq!(ranked[0], (GroupId(3), 0));
        // 0000, 1111 and 0011 sit at 2, 2 and 4
        assert_eq!(ranked[1], (GroupId(2), 2));
        assert_eq!(ranked[2], (GroupId(4), 2));
        assert_eq!(ranked[3], (GroupId(1), 4));
    }
    
    #[test]
    fn test_coordinated_joins_closest_within_threshold() {
        let candidates = vec![(GroupId(0), v("111000")), (GroupId(1), v("110000"))];
        assert_eq!(
            place_coordinated(&b("110001"), &candidates, 5).unwrap(),
            Placement::Join(GroupId(1))
        );
    }
    
    #[test]
    fn test_coordinated_opens_beyond_threshold() {
        // Distance 6 from every proxy, threshold 5
        let candidates = vec![(GroupId(0), v("000000")), (GroupId(1), v("000000"))];
        assert_eq!(
            place_coordinated(&b("111111"), &candidates, 5).unwrap(),
            Placement::Open
        );
        
        // Exactly at the threshold still joins
        let candidates = vec![(GroupId(0), v("000001"))];
        assert_eq!(
            place_coordinated(&b("111110"), &candidates, 6).unwrap(),
            Placement::Join(GroupId(0))
        );
    }
    
    #[test]
    fn test_coordinated_dimension_mismatch() {
        let candidates = vec![(GroupId(0), v("000"))];
        assert!(matches!(
            place_coordinated(&b("1111"), &candidates, 5),
            Err(VotingError::DimensionMismatch { .. })
        ));
    }
    
    #[test]
    fn test_policy_parse() {
        assert_eq!("Coordinated".parse::<GroupingPolicy>(), Ok(GroupingPolicy::Coordinated));
        assert_eq!(GroupingPolicy::Random.to_string(), "random");
        assert!("greedy".parse::<GroupingPolicy>().is_err());
    }
}
