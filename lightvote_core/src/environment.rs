//! CoordinationEnvironment - the registry agents, groups and chairs live in.
//!
//! This is the surface the agent runtime talks to. It owns every agent and
//! group, runs the group-formation protocol, triggers elections when groups
//! close and requests notifications for every state change.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   CoordinationEnvironment                     │
//! │  agents: RwLock<BTreeMap<AgentName, agent>>                   │
//! │  groups: RwLock<BTreeMap<GroupId, Arc<Group>>>                │
//! │  open:   RwLock<BTreeSet<GroupId>>   (listing for placement)  │
//! │                                                               │
//! │  request_join_group(agent)                                    │
//! │     │ snapshot open groups ──► grouping::place_*              │
//! │     ▼                                                         │
//! │  Group::admit  ── Mutex per group: check + append + vote      │
//! │     │ full? ──► close ──► ElectionRule::elect                 │
//! │     ▼                                                         │
//! │  Notifier::notify(kind, Notification)                         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lock order: registry locks before a group's mutex, never the reverse.
//! Elections run under the group mutex and touch no registry lock.

use crate::agent::{AgentHandle, VotingAgent};
use crate::ballot::{ApprovalVector, Ballot, Committee};
use crate::config::ElectionConfig;
use crate::dissatisfaction::{self, DissatisfactionReport};
use crate::election::{ElectionOutcome, ElectionRule, MinimaxApproval};
use crate::error::{ensure_len, VotingError};
use crate::group::{Admission, Group, GroupSnapshot};
use crate::grouping::{self, GroupingPolicy, Placement};
use crate::preference::PreferenceModel;

use lightvote_env::{
    AgentName, ChairName, EventKind, GroupId, Notifier, NullNotifier, SystemContext, VotingContext,
};
use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Payload of every notification the environment requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub group: GroupId,
    pub chair: ChairName,

    /// Agent that opened or joined (absent for elections)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentName>,

    /// Elected committee (elections only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee: Option<Committee>,
}

/// Result of one run of the group-formation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Admitted into an existing group
    Joined(GroupId),

    /// Founded a new group
    Opened(GroupId),
}

impl JoinOutcome {
    pub fn group(&self) -> GroupId {
        match self {
            JoinOutcome::Joined(id) | JoinOutcome::Opened(id) => *id,
        }
    }
}

/// Callback fired once per group closure with the election result.
pub type GroupClosedHook = Arc<dyn Fn(GroupId, &ElectionOutcome) + Send + Sync>;

struct RegisteredAgent {
    /// Registration order; selects the agent's random streams
    index: u64,
    handle: AgentHandle,
}

/// Random stream of agent `index` for preference generation.
fn preference_stream(index: u64) -> u64 {
    index << 1
}

/// Random stream of agent `index` for group placement.
fn placement_stream(index: u64) -> u64 {
    (index << 1) | 1
}

/// The shared registry of agents, groups and chairs.
///
/// Generic over the randomness source so that the same protocol code runs
/// seeded in simulation and entropy-backed in production.
pub struct CoordinationEnvironment<Ctx: VotingContext = SystemContext> {
    config: ElectionConfig,
    context: Arc<Ctx>,
    rule: Arc<dyn ElectionRule>,
    notifier: Arc<dyn Notifier<Notification>>,
    model: PreferenceModel,

    agents: RwLock<BTreeMap<AgentName, RegisteredAgent>>,
    groups: RwLock<BTreeMap<GroupId, Arc<Group>>>,
    open: RwLock<BTreeSet<GroupId>>,

    next_agent: AtomicU64,
    next_group: AtomicU64,
    closed_hook: RwLock<Option<GroupClosedHook>>,
}

impl<Ctx: VotingContext> CoordinationEnvironment<Ctx> {
    /// Creates an environment with exact Minimax Approval Voting and no notifications.
    ///
    /// # Errors
    /// Any configuration error from `ElectionConfig::validate`.
    pub fn new(config: ElectionConfig, context: Arc<Ctx>) -> Result<Self, VotingError> {
        config.validate()?;
        info!(
            "Coordination environment: m={} k={} capacity={} seed={}",
            config.num_alternatives(),
            config.committee_size,
            config.capacity,
            context.seed()
        );
        Ok(Self {
            config,
            context,
            rule: Arc::new(MinimaxApproval::new()),
            notifier: Arc::new(NullNotifier),
            model: PreferenceModel::new(),
            agents: RwLock::new(BTreeMap::new()),
            groups: RwLock::new(BTreeMap::new()),
            open: RwLock::new(BTreeSet::new()),
            next_agent: AtomicU64::new(0),
            next_group: AtomicU64::new(0),
            closed_hook: RwLock::new(None),
        })
    }

    /// Sets the election rule.
    pub fn with_rule(mut self, rule: Arc<dyn ElectionRule>) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the notification facility.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier<Notification>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<Ctx> {
        &self.context
    }

    pub fn rule(&self) -> &dyn ElectionRule {
        self.rule.as_ref()
    }

    /// Installs the callback fired once per group closure, replacing any earlier one.
    pub fn on_group_closed<F>(&self, hook: F)
    where
        F: Fn(GroupId, &ElectionOutcome) + Send + Sync + 'static,
    {
        *self.closed_hook.write() = Some(Arc::new(hook));
    }

    // =========================================================================
    // AGENTS
    // =========================================================================

    /// Registers an externally built agent.
    ///
    /// # Errors
    /// * `DimensionMismatch` - the ballot does not cover exactly `m` alternatives
    /// * `DuplicateAgent` - the name is taken
    pub fn register_agent(&self, agent: VotingAgent) -> Result<AgentHandle, VotingError> {
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed);
        self.insert_agent(index, agent)
    }

    /// Creates an agent with preferences drawn from its own seeded stream.
    pub fn create_agent(
        &self,
        name: AgentName,
        policy: GroupingPolicy,
        join_threshold: usize,
    ) -> Result<AgentHandle, VotingError> {
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed);
        let mut rng = self.context.derive_rng(preference_stream(index));
        let preferences = self.model.generate(self.config.num_alternatives(), &mut rng);
        self.insert_agent(index, VotingAgent::new(name, preferences, policy, join_threshold))
    }

    /// Creates an agent with the configured default policy and threshold.
    pub fn create_default_agent(&self, name: AgentName) -> Result<AgentHandle, VotingError> {
        self.create_agent(name, self.config.policy, self.config.join_threshold)
    }

    fn insert_agent(&self, index: u64, agent: VotingAgent) -> Result<AgentHandle, VotingError> {
        ensure_len(self.config.num_alternatives(), agent.ballot().len())?;

        let mut agents = self.agents.write();
        if agents.contains_key(agent.name()) {
            return Err(VotingError::DuplicateAgent(agent.name().clone()));
        }
        let handle = Arc::new(agent);
        debug!("Registered {} (ballot {})", handle.name(), handle.ballot());
        agents.insert(
            handle.name().clone(),
            RegisteredAgent {
                index,
                handle: Arc::clone(&handle),
            },
        );
        Ok(handle)
    }

    pub fn agent(&self, name: &AgentName) -> Option<AgentHandle> {
        self.agents.read().get(name).map(|r| Arc::clone(&r.handle))
    }

    /// All agents, ordered by name.
    pub fn agents(&self) -> Vec<AgentHandle> {
        self.agents.read().values().map(|r| Arc::clone(&r.handle)).collect()
    }

    fn agent_index(&self, agent: &VotingAgent) -> Result<u64, VotingError> {
        self.agents
            .read()
            .get(agent.name())
            .map(|r| r.index)
            .ok_or_else(|| VotingError::UnknownAgent(agent.name().clone()))
    }

    // =========================================================================
    // GROUP FORMATION
    // =========================================================================

    /// Runs the group-formation protocol once for `agent`, using its seeded
    /// placement stream.
    ///
    /// A full or just-closed target group is not an error: the agent founds
    /// a new group instead.
    ///
    /// # Errors
    /// * `AlreadyAssigned` - the agent already went through the protocol
    /// * `UnknownAgent` - the agent is not registered here
    pub fn request_join_group(&self, agent: &AgentHandle) -> Result<JoinOutcome, VotingError> {
        let index = self.agent_index(agent)?;
        let mut rng = self.context.derive_rng(placement_stream(index));
        self.request_join_group_with(agent, &mut rng)
    }

    /// Same as `request_join_group`, drawing random choices from `rng`.
    pub fn request_join_group_with<R: Rng + ?Sized>(
        &self,
        agent: &AgentHandle,
        rng: &mut R,
    ) -> Result<JoinOutcome, VotingError> {
        self.agent_index(agent)?;
        self.claimed(agent, || {
            let placement = match agent.policy() {
                GroupingPolicy::Random => {
                    let open: Vec<GroupId> = self.open.read().iter().copied().collect();
                    grouping::place_random(&open, rng)
                }
                GroupingPolicy::Coordinated => {
                    let candidates: Vec<(GroupId, ApprovalVector)> = self
                        .open_group_handles()
                        .iter()
                        .map(|g| (g.id(), g.proxy()))
                        .collect();
                    grouping::place_coordinated(agent.ballot(), &candidates, agent.join_threshold())?
                }
            };

            match placement {
                Placement::Open => self.found_group(agent).map(JoinOutcome::Opened),
                Placement::Join(id) => match self.admit(agent, id) {
                    Ok(()) => Ok(JoinOutcome::Joined(id)),
                    Err(VotingError::CapacityExceeded(_)) | Err(VotingError::GroupClosed(_)) => {
                        debug!("{} lost the race for {}, opening a new group", agent.name(), id);
                        self.found_group(agent).map(JoinOutcome::Opened)
                    }
                    Err(e) => Err(e),
                },
            }
        })
    }

    /// Founds a new group with `agent` as its first member and its own chair.
    ///
    /// # Errors
    /// * `AlreadyAssigned` - the agent already belongs to a group
    pub fn open_group(&self, agent: &AgentHandle) -> Result<GroupId, VotingError> {
        self.agent_index(agent)?;
        self.claimed(agent, || self.found_group(agent))
    }

    /// Adds `agent` to a specific group.
    ///
    /// Unlike `request_join_group`, a full or closed group is reported to the
    /// caller (`CapacityExceeded` / `GroupClosed`) and the agent stays unassigned.
    pub fn join_group(&self, agent: &AgentHandle, group: GroupId) -> Result<GroupId, VotingError> {
        self.agent_index(agent)?;
        self.claimed(agent, || self.admit(agent, group).map(|()| group))
    }

    /// Closes an open group before it is full and elects its committee.
    ///
    /// # Errors
    /// * `UnknownGroup`
    /// * `GroupClosed` - the group already closed (and elected) earlier
    pub fn close_group_and_elect(&self, group: GroupId) -> Result<ElectionOutcome, VotingError> {
        let handle = self.group_handle(group)?;
        let outcome = handle.close(|id, ballots| self.elect(id, ballots))?;
        self.after_close(&handle, &outcome);
        Ok(outcome)
    }

    /// Closes every group that is still open. Returns the outcomes by group.
    pub fn finalize(&self) -> Result<Vec<(GroupId, ElectionOutcome)>, VotingError> {
        let mut outcomes = Vec::new();
        for handle in self.open_group_handles() {
            match handle.close(|id, ballots| self.elect(id, ballots)) {
                Ok(outcome) => {
                    self.after_close(&handle, &outcome);
                    outcomes.push((handle.id(), outcome));
                }
                // Filled concurrently; already elected
                Err(VotingError::GroupClosed(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }

    /// Runs `f` while `agent` holds its formation claim; releases the claim on failure.
    fn claimed<T>(
        &self,
        agent: &AgentHandle,
        f: impl FnOnce() -> Result<T, VotingError>,
    ) -> Result<T, VotingError> {
        if agent.is_assigned() || !agent.try_claim() {
            return Err(VotingError::AlreadyAssigned(agent.name().clone()));
        }
        let result = f();
        if result.is_err() {
            agent.release_claim();
        }
        result
    }

    fn found_group(&self, agent: &AgentHandle) -> Result<GroupId, VotingError> {
        let id = GroupId(self.next_group.fetch_add(1, Ordering::Relaxed));
        let chair = ChairName::for_founder(agent.name(), id);
        let group = Arc::new(Group::new(
            id,
            chair.clone(),
            self.config.capacity,
            self.config.num_alternatives(),
        ));

        // Founder is admitted before anyone else can see the group
        let admission = group.admit(agent, |gid, ballots| self.elect(gid, ballots))?;
        {
            let mut open = self.open.write();
            self.groups.write().insert(id, Arc::clone(&group));
            // A direct join may fill the group the moment it is registered
            if group.is_open() {
                open.insert(id);
            }
        }

        debug!("{} opened {} ({})", agent.name(), id, chair);
        self.notifier.notify(
            EventKind::GroupOpened,
            Notification {
                group: id,
                chair,
                agent: Some(agent.name().clone()),
                committee: None,
            },
        );

        if let Admission::Filled { outcome } = admission {
            self.after_close(&group, &outcome);
        }
        Ok(id)
    }

    fn admit(&self, agent: &AgentHandle, id: GroupId) -> Result<(), VotingError> {
        let group = self.group_handle(id)?;
        let admission = group.admit(agent, |gid, ballots| self.elect(gid, ballots))?;

        debug!("{} joined {}", agent.name(), id);
        self.notifier.notify(
            EventKind::AgentJoined,
            Notification {
                group: id,
                chair: group.snapshot().chair,
                agent: Some(agent.name().clone()),
                committee: None,
            },
        );

        if let Admission::Filled { outcome } = admission {
            self.after_close(&group, &outcome);
        }
        Ok(())
    }

    /// Runs the configured rule over a closing group's ballots.
    fn elect(&self, id: GroupId, ballots: &[Ballot]) -> Result<ElectionOutcome, VotingError> {
        // Groups are founded with a member, so an empty electorate means broken sequencing
        assert!(!ballots.is_empty(), "{} closed with an empty electorate", id);

        let outcome = ElectionOutcome::elect(self.rule.as_ref(), ballots, self.config.committee_size)
            .map_err(|e| {
                warn!("{} election via {} failed: {}", id, self.rule.name(), e);
                e
            })?;
        info!(
            "{} elected {} ({:?}) worst-case distance {} via {}",
            id,
            outcome.committee,
            self.config.alternatives.describe(outcome.committee.members()),
            outcome.worst_case,
            outcome.rule
        );
        Ok(outcome)
    }

    /// Bookkeeping after a closure; runs outside the group's lock.
    fn after_close(&self, group: &Group, outcome: &ElectionOutcome) {
        self.open.write().remove(&group.id());
        self.notifier.notify(
            EventKind::CommitteeElected,
            Notification {
                group: group.id(),
                chair: group.snapshot().chair,
                agent: None,
                committee: Some(outcome.committee.clone()),
            },
        );
        // Cloned out so the hook may install a new one
        let hook = self.closed_hook.read().clone();
        if let Some(hook) = hook {
            hook(group.id(), outcome);
        }
    }

    // =========================================================================
    // DISSATISFACTION
    // =========================================================================

    /// Scores `agent` against `committee` and reports the score to the chair
    /// of the agent's group.
    ///
    /// # Errors
    /// * `DimensionMismatch` - the committee does not cover `m` alternatives
    pub fn submit_dissatisfaction(&self, agent: &AgentHandle, committee: &Committee) -> Result<f64, VotingError> {
        let score = dissatisfaction::score(agent.preferences(), committee)?;
        match agent.group().map(|id| self.group_handle(id)) {
            Some(Ok(group)) => group.record_dissatisfaction(agent.name().clone(), score),
            Some(Err(e)) => return Err(e),
            None => warn!("{} reported dissatisfaction without a group", agent.name()),
        }
        Ok(score)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    fn group_handle(&self, id: GroupId) -> Result<Arc<Group>, VotingError> {
        self.groups
            .read()
            .get(&id)
            .cloned()
            .ok_or(VotingError::UnknownGroup(id))
    }

    fn open_group_handles(&self) -> Vec<Arc<Group>> {
        let open: Vec<GroupId> = self.open.read().iter().copied().collect();
        let groups = self.groups.read();
        open.iter().filter_map(|id| groups.get(id).cloned()).collect()
    }

    /// The committee elected by `group`, once it closed.
    pub fn committee(&self, group: GroupId) -> Option<Committee> {
        self.outcome(group).map(|o| o.committee)
    }

    pub fn outcome(&self, group: GroupId) -> Option<ElectionOutcome> {
        self.group_handle(group).ok().and_then(|g| g.outcome())
    }

    pub fn group_snapshot(&self, group: GroupId) -> Option<GroupSnapshot> {
        self.group_handle(group).ok().map(|g| g.snapshot())
    }

    /// Snapshots of all groups, ordered by id.
    pub fn groups(&self) -> Vec<GroupSnapshot> {
        let handles: Vec<Arc<Group>> = self.groups.read().values().cloned().collect();
        handles.iter().map(|g| g.snapshot()).collect()
    }

    /// Snapshots of the groups currently open, ordered by id.
    pub fn open_groups(&self) -> Vec<GroupSnapshot> {
        self.open_group_handles().iter().map(|g| g.snapshot()).collect()
    }

    pub fn dissatisfaction_report(&self, group: GroupId) -> Option<DissatisfactionReport> {
        self.group_snapshot(group).map(|s| s.dissatisfaction)
    }
}
