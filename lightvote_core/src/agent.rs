//! Voting agents: preferences, ballot and the little mutable state they own.

use crate::ballot::{Ballot, Committee};
use crate::config::DEFAULT_JOIN_THRESHOLD;
use crate::group::Chair;
use crate::grouping::GroupingPolicy;
use crate::preference::{PreferenceModel, PreferenceVector};
use lightvote_env::{AgentName, GroupId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared handle to an agent, as handed to the agent runtime.
pub type AgentHandle = Arc<VotingAgent>;

/// A voting agent.
///
/// Preferences and ballot are fixed at creation. The only mutable parts are
/// monotonic: the `voted` flag (false → true once), the group assignment and
/// the committee received from the group's chair (each set at most once).
#[derive(Debug)]
pub struct VotingAgent {
    name: AgentName,
    preferences: PreferenceVector,
    ballot: Ballot,
    policy: GroupingPolicy,
    join_threshold: usize,
    
    /// Set by the first successful vote submission
    voted: AtomicBool,
    
    /// Guards against concurrent group-formation attempts for this agent
    claimed: AtomicBool,
    
    /// Weak membership reference; the group owns the member list
    group: OnceLock<GroupId>,
    
    /// Committee elected by this agent's group
    committee: OnceLock<Committee>,
}

impl VotingAgent {
    /// Creates an agent whose ballot is derived from `preferences`.
    pub fn new(
        name: AgentName,
        preferences: PreferenceVector,
        policy: GroupingPolicy,
        join_threshold: usize,
    ) -> Self {
        let ballot = PreferenceModel::new().derive_ballot(&preferences);
        Self {
            name,
            preferences,
            ballot,
            policy,
            join_threshold,
            voted: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
            group: OnceLock::new(),
            committee: OnceLock::new(),
        }
    }
    
    /// Creates a random-policy agent with the default threshold.
    pub fn with_preferences(name: AgentName, preferences: PreferenceVector) -> Self {
        Self::new(name, preferences, GroupingPolicy::Random, DEFAULT_JOIN_THRESHOLD)
    }
    
    pub fn name(&self) -> &AgentName {
        &self.name
    }
    
    pub fn preferences(&self) -> &PreferenceVector {
        &self.preferences
    }
    
    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }
    
    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }
    
    pub fn join_threshold(&self) -> usize {
        self.join_threshold
    }
    
    pub fn has_voted(&self) -> bool {
        self.voted.load(Ordering::Acquire)
    }
    
    /// The group this agent belongs to, once assigned.
    pub fn group(&self) -> Option<GroupId> {
        self.group.get().copied()
    }
    
    pub fn is_assigned(&self) -> bool {
        self.group.get().is_some()
    }
    
    /// The committee elected by this agent's group, once known.
    pub fn committee(&self) -> Option<&Committee> {
        self.committee.get()
    }
    
    /// Hands a copy of the ballot to `chair`.
    ///
    /// Only the first call has an effect; returns whether this call voted.
    pub fn submit_vote(&self, chair: &mut Chair) -> bool {
        if self
            .voted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        chair.receive_vote(self.name.clone(), self.ballot.clone());
        true
    }
    
    /// Starts group formation. False if another attempt is running or done.
    pub(crate) fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
    
    /// Abandons a failed attempt so the agent may try again.
    pub(crate) fn release_claim(&self) {
        if !self.is_assigned() {
            self.claimed.store(false, Ordering::Release);
        }
    }
    
    pub(crate) fn assign(&self, group: GroupId) {
        let _ = self.group.set(group);
    }
    
    pub(crate) fn receive_committee(&self, committee: Committee) {
        let _ = self.committee.set(committee);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightvote_env::ChairName;
    
    fn agent() -> VotingAgent {
        let prefs = PreferenceVector::from_values(vec![0.6, 0.4, 0.55, 0.45]).unwrap();
        VotingAgent::with_preferences(AgentName::from("alice"), prefs)
    }
    
    #[test]
    fn test_ballot_derived_at_creation() {
        let a = agent();
        assert_eq!(a.ballot().to_string(), "1010");
        assert_eq!(a.policy(), GroupingPolicy::Random);
        assert_eq!(a.join_threshold(), 5);
        assert!(!a.has_voted());
        assert!(!a.is_assigned());
    }
    
    #[test]
    fn test_vote_submission_is_idempotent() {
        let a = agent();
        let mut chair = Chair::new(ChairName("chair-0".into()));
        
        assert!(a.submit_vote(&mut chair));
        assert!(a.has_voted());
        assert!(!a.submit_vote(&mut chair));
        
        assert_eq!(chair.ballots().len(), 1);
        assert_eq!(chair.ballots()[0].to_string(), "1010");
    }
    
    #[test]
    fn test_claim_released_only_while_unassigned() {
        let a = agent();
        assert!(a.try_claim());
        assert!(!a.try_claim());
        
        a.release_claim();
        assert!(a.try_claim());
        
        a.assign(GroupId(2));
        a.release_claim();
        assert!(!a.try_claim());
        assert_eq!(a.group(), Some(GroupId(2)));
    }
}
