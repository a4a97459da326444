//! Synthetic cardinal preferences and the approval ballots derived from them.
//!
//! Each preference value is `sigmoid(u)` with `u` uniform on `[-0.5, 0.5)`,
//! so values land in roughly `(0.378, 0.622)`. A ballot approves exactly the
//! alternatives rated strictly above `0.5`.

use crate::ballot::{ApprovalVector, Ballot};
use crate::error::VotingError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Preference values above this are approved.
pub const APPROVAL_THRESHOLD: f64 = 0.5;

/// Per-alternative preference values in `(0, 1)`. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceVector {
    values: Vec<f64>,
}

impl PreferenceVector {
    /// Wraps explicit values, each of which must lie in `[0, 1]`.
    pub fn from_values(values: Vec<f64>) -> Result<Self, VotingError> {
        if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(VotingError::config(format!("preference value {} outside [0, 1]", bad)));
        }
        Ok(Self { values })
    }
    
    /// Number of alternatives.
    pub fn len(&self) -> usize {
        self.values.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    
    pub fn get(&self, alternative: usize) -> Option<f64> {
        self.values.get(alternative).copied()
    }
    
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Logistic function, base e.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Generates preferences and derives ballots.
#[derive(Debug, Default, Clone, Copy)]
pub struct PreferenceModel;

impl PreferenceModel {
    pub fn new() -> Self {
        Self
    }
    
    /// Draws `m` independent preference values from the given RNG.
    pub fn generate<R: Rng + ?Sized>(&self, m: usize, rng: &mut R) -> PreferenceVector {
        let values = (0..m)
            .map(|_| sigmoid(rng.gen::<f64>() - 0.5))
            .collect();
        PreferenceVector { values }
    }
    
    /// Approves alternative `i` iff `preferences[i] > 0.5`.
    pub fn derive_ballot(&self, preferences: &PreferenceVector) -> Ballot {
        let bits: Vec<bool> = preferences
            .values
            .iter()
            .map(|&p| p > APPROVAL_THRESHOLD)
            .collect();
        Ballot::new(ApprovalVector::from_bits(&bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    
    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert_relative_eq!(sigmoid(0.5), 0.622_459_331_201_854_6, epsilon = 1e-12);
        assert_relative_eq!(sigmoid(-0.5) + sigmoid(0.5), 1.0, epsilon = 1e-12);
    }
    
    #[test]
    fn test_generate_range_and_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let prefs = PreferenceModel::new().generate(50, &mut rng);
        
        assert_eq!(prefs.len(), 50);
        for &p in prefs.values() {
            assert!(p > sigmoid(-0.5) - 1e-12 && p < sigmoid(0.5));
        }
    }
    
    #[test]
    fn test_generate_is_reproducible_per_seed() {
        let model = PreferenceModel::new();
        let a = model.generate(8, &mut ChaCha8Rng::seed_from_u64(1));
        let b = model.generate(8, &mut ChaCha8Rng::seed_from_u64(1));
        let c = model.generate(8, &mut ChaCha8Rng::seed_from_u64(2));
        
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
    
    #[test]
    fn test_threshold_is_strict() {
        let prefs = PreferenceVector::from_values(vec![0.5, 0.50001, 0.2, 0.9]).unwrap();
        let ballot = PreferenceModel::new().derive_ballot(&prefs);
        assert_eq!(ballot.to_string(), "0101");
    }
    
    #[test]
    fn test_from_values_rejects_out_of_range() {
        assert!(PreferenceVector::from_values(vec![0.3, 1.2]).is_err());
        assert!(PreferenceVector::from_values(vec![f64::NAN]).is_err());
    }
    
    proptest! {
        #[test]
        fn prop_ballot_derivation_matches_threshold(values in prop::collection::vec(0.0f64..=1.0, 0..40)) {
            let prefs = PreferenceVector::from_values(values.clone()).unwrap();
            let ballot = PreferenceModel::new().derive_ballot(&prefs);
            
            prop_assert_eq!(ballot.len(), values.len());
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(ballot.approves(i), *v > 0.5);
            }
        }
    }
}
