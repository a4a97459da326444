//! Voter dissatisfaction with a realized committee.
//!
//! Electing alternative `i` costs a voter `1 - preference[i]`: a well-liked
//! alternative costs almost nothing, a disliked one almost a full point.
//! Alternatives left out of the committee cost nothing.

use crate::ballot::Committee;
use crate::error::{ensure_len, VotingError};
use crate::preference::PreferenceVector;
use serde::{Deserialize, Serialize};

/// Dissatisfaction of one voter with `committee`. Lower is better.
///
/// Always within `[0, |committee|]`.
pub fn score(preferences: &PreferenceVector, committee: &Committee) -> Result<f64, VotingError> {
    ensure_len(committee.len(), preferences.len())?;
    Ok(committee
        .members()
        .ones()
        .map(|i| 1.0 - preferences.values()[i])
        .sum())
}

/// Aggregate of the dissatisfaction scores reported to one chair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DissatisfactionReport {
    /// Number of scores
    pub count: usize,
    /// Sum of scores (utilitarian view)
    pub total: f64,
    /// Mean score, 0 when empty
    pub mean: f64,
    /// Largest score (egalitarian / worst-case view)
    pub worst: f64,
}

impl DissatisfactionReport {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let total: f64 = scores.iter().sum();
        Self {
            count: scores.len(),
            total,
            mean: total / scores.len() as f64,
            worst: scores.iter().copied().fold(f64::MIN, f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot::ApprovalVector;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    
    fn committee(bits: &str) -> Committee {
        let v: ApprovalVector = bits.parse().unwrap();
        let k = v.count_ones();
        Committee::with_size(v, k).unwrap()
    }
    
    #[test]
    fn test_score_sums_elected_complements() {
        let prefs = PreferenceVector::from_values(vec![0.9, 0.1, 0.6, 0.4]).unwrap();
        
        assert_relative_eq!(score(&prefs, &committee("1010")).unwrap(), 0.1 + 0.4, epsilon = 1e-12);
        assert_relative_eq!(score(&prefs, &committee("0100")).unwrap(), 0.9, epsilon = 1e-12);
        assert_relative_eq!(score(&prefs, &committee("0000")).unwrap(), 0.0);
    }
    
    #[test]
    fn test_score_dimension_mismatch() {
        let prefs = PreferenceVector::from_values(vec![0.9, 0.1, 0.6]).unwrap();
        let err = score(&prefs, &committee("1010")).unwrap_err();
        assert_eq!(err, VotingError::DimensionMismatch { expected: 4, found: 3 });
    }
    
    #[test]
    fn test_report_aggregates() {
        let report = DissatisfactionReport::from_scores(&[0.5, 1.5, 1.0]);
        assert_eq!(report.count, 3);
        assert_relative_eq!(report.total, 3.0);
        assert_relative_eq!(report.mean, 1.0);
        assert_relative_eq!(report.worst, 1.5);
        
        assert_eq!(DissatisfactionReport::from_scores(&[]), DissatisfactionReport::default());
    }
    
    proptest! {
        #[test]
        fn prop_score_bounded_by_committee_size(
            pairs in prop::collection::vec((0.0f64..=1.0, any::<bool>()), 1..32)
        ) {
            let prefs = PreferenceVector::from_values(pairs.iter().map(|p| p.0).collect()).unwrap();
            let bits: Vec<bool> = pairs.iter().map(|p| p.1).collect();
            let v = ApprovalVector::from_bits(&bits);
            let k = v.count_ones();
            let c = Committee::with_size(v, k).unwrap();
            
            let s = score(&prefs, &c).unwrap();
            prop_assert!(s >= 0.0);
            prop_assert!(s <= k as f64 + 1e-9);
        }
    }
}
