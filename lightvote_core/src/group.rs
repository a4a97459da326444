//! Groups and their chairs.
//!
//! A `Group` is the serialization point for everything that happens to its
//! membership: admission, the capacity check, closure and the election all
//! run under one `parking_lot::Mutex`. Two agents racing for the last seat
//! cannot both get it, and nobody observes a closed group without its
//! committee.

use crate::agent::AgentHandle;
use crate::ballot::{ApprovalVector, Ballot};
use crate::dissatisfaction::DissatisfactionReport;
use crate::election::ElectionOutcome;
use crate::error::VotingError;
use lightvote_env::{AgentName, ChairName, GroupId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a group. Only ever moves Open → Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Open,
    Closed,
}

/// Coordinator of one group: collects ballots, later dissatisfaction reports.
#[derive(Debug, Clone)]
pub struct Chair {
    name: ChairName,
    ballots: Vec<(AgentName, Ballot)>,
    dissatisfaction: Vec<(AgentName, f64)>,
}

impl Chair {
    pub fn new(name: ChairName) -> Self {
        Self {
            name,
            ballots: Vec::new(),
            dissatisfaction: Vec::new(),
        }
    }

    pub fn name(&self) -> &ChairName {
        &self.name
    }

    /// Records a ballot. Agents call this through `VotingAgent::submit_vote`.
    pub fn receive_vote(&mut self, voter: AgentName, ballot: Ballot) {
        self.ballots.push((voter, ballot));
    }

    /// Ballots in the order they were received.
    pub fn ballots(&self) -> Vec<Ballot> {
        self.ballots.iter().map(|(_, b)| b.clone()).collect()
    }

    pub fn voters(&self) -> impl Iterator<Item = &AgentName> {
        self.ballots.iter().map(|(name, _)| name)
    }

    /// Records a voter's dissatisfaction; a repeated report replaces the earlier one.
    pub fn receive_dissatisfaction(&mut self, voter: AgentName, score: f64) {
        match self.dissatisfaction.iter_mut().find(|(name, _)| *name == voter) {
            Some(entry) => entry.1 = score,
            None => self.dissatisfaction.push((voter, score)),
        }
    }

    pub fn dissatisfaction_report(&self) -> DissatisfactionReport {
        let scores: Vec<f64> = self.dissatisfaction.iter().map(|(_, s)| *s).collect();
        DissatisfactionReport::from_scores(&scores)
    }
}

/// Result of a successful admission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Admitted; the group stays open with `size` members
    Joined { size: usize },

    /// Admitted as the last member; the group closed and elected
    Filled { outcome: ElectionOutcome },
}

/// Read-only view of a group at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub chair: ChairName,
    pub capacity: usize,
    pub status: GroupStatus,

    /// Members in join order
    pub members: Vec<AgentName>,

    /// Vector coordinated agents measure their distance against
    pub proxy: ApprovalVector,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ElectionOutcome>,

    pub dissatisfaction: DissatisfactionReport,
}

#[derive(Debug)]
struct GroupState {
    members: Vec<AgentHandle>,
    chair: Chair,
    status: GroupStatus,

    /// Per-alternative approval counts over current members
    approvals: Vec<usize>,
    outcome: Option<ElectionOutcome>,
}

impl GroupState {
    /// Committee once elected, otherwise the strict-majority approval vector.
    fn proxy(&self) -> ApprovalVector {
        if let Some(outcome) = &self.outcome {
            return outcome.committee.members().clone();
        }
        let n = self.members.len();
        let bits: Vec<bool> = self.approvals.iter().map(|&c| 2 * c > n).collect();
        ApprovalVector::from_bits(&bits)
    }
}

/// A capacity-bounded voting group.
#[derive(Debug)]
pub struct Group {
    id: GroupId,
    capacity: usize,
    state: Mutex<GroupState>,
}

impl Group {
    /// Creates an empty open group over `m` alternatives.
    pub fn new(id: GroupId, chair: ChairName, capacity: usize, m: usize) -> Self {
        Self {
            id,
            capacity,
            state: Mutex::new(GroupState {
                members: Vec::new(),
                chair: Chair::new(chair),
                status: GroupStatus::Open,
                approvals: vec![0; m],
                outcome: None,
            }),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn status(&self) -> GroupStatus {
        self.state.lock().status
    }

    pub fn is_open(&self) -> bool {
        self.status() == GroupStatus::Open
    }

    pub fn len(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn proxy(&self) -> ApprovalVector {
        self.state.lock().proxy()
    }

    pub fn outcome(&self) -> Option<ElectionOutcome> {
        self.state.lock().outcome.clone()
    }

    /// Atomic check-and-append.
    ///
    /// The agent is appended, assigned to this group and casts its vote with
    /// the chair. If that fills the group, `elect` runs on the collected
    /// ballots first and the group closes before the lock is released.
    ///
    /// # Errors
    /// * `GroupClosed` / `CapacityExceeded` - nothing was changed; open a new group instead
    /// * `DimensionMismatch` - the agent's ballot does not fit this group
    /// * whatever `elect` returns; the group stays open without the agent
    pub(crate) fn admit<F>(&self, agent: &AgentHandle, elect: F) -> Result<Admission, VotingError>
    where
        F: FnOnce(GroupId, &[Ballot]) -> Result<ElectionOutcome, VotingError>,
    {
        let mut state = self.state.lock();
        if state.status == GroupStatus::Closed {
            return Err(VotingError::GroupClosed(self.id));
        }
        if state.members.len() >= self.capacity {
            return Err(VotingError::CapacityExceeded(self.id));
        }
        crate::error::ensure_len(state.approvals.len(), agent.ballot().len())?;

        let outcome = if state.members.len() + 1 == self.capacity {
            let mut ballots = state.chair.ballots();
            ballots.push(agent.ballot().clone());
            Some(elect(self.id, &ballots)?)
        } else {
            None
        };

        for i in agent.ballot().approvals().ones() {
            state.approvals[i] += 1;
        }
        state.members.push(AgentHandle::clone(agent));
        agent.assign(self.id);
        agent.submit_vote(&mut state.chair);

        match outcome {
            Some(outcome) => {
                Self::commit_close(&mut state, &outcome);
                Ok(Admission::Filled { outcome })
            }
            None => Ok(Admission::Joined { size: state.members.len() }),
        }
    }

    /// Closes an open group ahead of capacity and elects its committee.
    ///
    /// A failing `elect` leaves the group open and unchanged.
    pub(crate) fn close<F>(&self, elect: F) -> Result<ElectionOutcome, VotingError>
    where
        F: FnOnce(GroupId, &[Ballot]) -> Result<ElectionOutcome, VotingError>,
    {
        let mut state = self.state.lock();
        if state.status == GroupStatus::Closed {
            return Err(VotingError::GroupClosed(self.id));
        }
        let outcome = elect(self.id, &state.chair.ballots())?;
        Self::commit_close(&mut state, &outcome);
        Ok(outcome)
    }

    fn commit_close(state: &mut GroupState, outcome: &ElectionOutcome) {
        state.status = GroupStatus::Closed;
        for member in &state.members {
            member.receive_committee(outcome.committee.clone());
        }
        state.outcome = Some(outcome.clone());
    }

    /// Forwards a member's dissatisfaction report to the chair.
    pub(crate) fn record_dissatisfaction(&self, voter: AgentName, score: f64) {
        self.state.lock().chair.receive_dissatisfaction(voter, score);
    }

    pub fn snapshot(&self) -> GroupSnapshot {
        let state = self.state.lock();
        GroupSnapshot {
            id: self.id,
            chair: state.chair.name().clone(),
            capacity: self.capacity,
            status: state.status,
            members: state.members.iter().map(|a| a.name().clone()).collect(),
            proxy: state.proxy(),
            outcome: state.outcome.clone(),
            dissatisfaction: state.chair.dissatisfaction_report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::VotingAgent;
    use crate::election::MinimaxApproval;
    use crate::preference::PreferenceVector;
    use std::sync::Arc;

    /// Agent whose ballot is exactly `bits`.
    fn agent(name: &str, bits: &str) -> AgentHandle {
        let values = bits.chars().map(|c| if c == '1' { 0.6 } else { 0.4 }).collect();
        let prefs = PreferenceVector::from_values(values).unwrap();
        Arc::new(VotingAgent::with_preferences(AgentName::from(name), prefs))
    }

    fn minimax(k: usize) -> impl FnOnce(GroupId, &[Ballot]) -> Result<ElectionOutcome, VotingError> {
        move |_, ballots| ElectionOutcome::elect(&MinimaxApproval::new(), ballots, k)
    }

    fn group(capacity: usize) -> Group {
        Group::new(GroupId(0), ChairName("chair-0".into()), capacity, 4)
    }

    #[test]
    fn test_admit_until_full_then_elect() {
        let g = group(3);
        let (a, b, c) = (agent("a", "1100"), agent("b", "1010"), agent("c", "0110"));

        assert_eq!(g.admit(&a, minimax(2)).unwrap(), Admission::Joined { size: 1 });
        assert_eq!(g.admit(&b, minimax(2)).unwrap(), Admission::Joined { size: 2 });

        let outcome = match g.admit(&c, minimax(2)).unwrap() {
            Admission::Filled { outcome } => outcome,
            other => panic!("expected closure, got {:?}", other),
        };
        assert_eq!(outcome.committee.to_string(), "1100");
        assert_eq!(outcome.worst_case, 2);

        assert_eq!(g.status(), GroupStatus::Closed);
        for member in [&a, &b, &c] {
            assert!(member.has_voted());
            assert_eq!(member.group(), Some(GroupId(0)));
            assert_eq!(member.committee(), Some(&outcome.committee));
        }
    }

    #[test]
    fn test_closed_group_rejects_without_side_effects() {
        let g = group(1);
        let a = agent("a", "1100");
        assert!(matches!(g.admit(&a, minimax(1)).unwrap(), Admission::Filled { .. }));

        let late = agent("late", "0011");
        assert_eq!(g.admit(&late, minimax(1)), Err(VotingError::GroupClosed(GroupId(0))));
        assert!(!late.has_voted());
        assert!(!late.is_assigned());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let g = group(3);
        let wrong = agent("wrong", "110");
        assert!(matches!(
            g.admit(&wrong, minimax(1)),
            Err(VotingError::DimensionMismatch { .. })
        ));
        assert!(g.is_empty());
    }

    #[test]
    fn test_proxy_is_strict_majority_then_committee() {
        let g = group(4);
        g.admit(&agent("a", "1100"), minimax(2)).unwrap();
        assert_eq!(g.proxy().to_string(), "1100");

        g.admit(&agent("b", "1010"), minimax(2)).unwrap();
        // 2 of 2 approve a0; a1 and a2 only half
        assert_eq!(g.proxy().to_string(), "1000");

        g.admit(&agent("c", "0110"), minimax(2)).unwrap();
        assert_eq!(g.proxy().to_string(), "1110");

        let outcome = g.close(minimax(2)).unwrap();
        assert_eq!(g.proxy(), *outcome.committee.members());
        assert_eq!(g.close(minimax(2)), Err(VotingError::GroupClosed(GroupId(0))));
    }

    #[test]
    fn test_failed_election_leaves_group_untouched() {
        let g = group(2);
        let (a, b) = (agent("a", "1100"), agent("b", "0011"));
        g.admit(&a, minimax(1)).unwrap();

        let refuse = |_: GroupId, _: &[Ballot]| -> Result<ElectionOutcome, VotingError> {
            Err(VotingError::config("rule unavailable"))
        };
        assert_eq!(g.admit(&b, refuse), Err(VotingError::config("rule unavailable")));
        assert_eq!(g.status(), GroupStatus::Open);
        assert_eq!(g.len(), 1);
        assert_eq!(g.proxy().to_string(), "1100");
        assert!(!b.is_assigned());
        assert!(!b.has_voted());

        assert_eq!(g.close(refuse), Err(VotingError::config("rule unavailable")));
        assert!(g.is_open());
        assert!(a.committee().is_none());

        // A working rule still closes it afterwards
        assert!(matches!(g.admit(&b, minimax(1)).unwrap(), Admission::Filled { .. }));
        assert_eq!(g.snapshot().members.len(), 2);
        assert!(a.committee().is_some() && b.committee().is_some());
    }

    #[test]
    fn test_chair_dissatisfaction_reports() {
        let mut chair = Chair::new(ChairName("chair".into()));
        chair.receive_dissatisfaction(AgentName::from("a"), 0.5);
        chair.receive_dissatisfaction(AgentName::from("b"), 1.0);
        chair.receive_dissatisfaction(AgentName::from("a"), 0.25);

        let report = chair.dissatisfaction_report();
        assert_eq!(report.count, 2);
        assert_eq!(report.worst, 1.0);
        assert_eq!(report.total, 1.25);
    }

    #[test]
    fn test_snapshot() {
        let g = group(3);
        g.admit(&agent("a", "0011"), minimax(2)).unwrap();
        let snap = g.snapshot();

        assert_eq!(snap.members, vec![AgentName::from("a")]);
        assert_eq!(snap.status, GroupStatus::Open);
        assert_eq!(snap.proxy.to_string(), "0011");
        assert!(snap.outcome.is_none());
    }
}
