//! Scenario runner - executes simulation scenarios and checks invariants.

use crate::error::SimError;
use crate::report::SimReport;
use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimWorld};

use lightvote_core::election::worst_case_distance;
use lightvote_core::{
    Ballot, ElectionConfig, ElectionOutcome, GroupStatus, GroupingPolicy, MinimaxApproval, RuleKind,
};
use lightvote_env::EventKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// Full report (absent if the run aborted before producing one)
    pub report: Option<SimReport>,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    /// Agents that took part
    pub agents: usize,

    /// Groups formed
    pub groups: usize,

    /// Groups closed early by finalization
    pub finalized_groups: usize,

    /// Size of the largest group
    pub largest_group: usize,

    /// Mean members per group
    pub mean_group_size: f64,

    /// Notifications delivered
    pub notifications: usize,

    /// Largest worst-case ballot distance over all elected committees
    pub max_worst_case: usize,

    /// Largest excess of the configured rule over exact minimax (0 for the exact rule)
    pub approximation_gap: usize,

    /// Mean dissatisfaction over all agents
    pub mean_dissatisfaction: f64,

    /// Largest dissatisfaction of any agent
    pub worst_dissatisfaction: f64,
}

/// Runs simulation scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of agents
    num_agents: usize,

    /// Worker threads for concurrent scenarios
    workers: usize,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, num_agents: usize) -> Self {
        Self {
            seed,
            num_agents,
            workers: 8,
        }
    }

    /// Sets the worker thread count for concurrent scenarios.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Simulation configuration for a scenario.
    pub fn config(&self, scenario: ScenarioId) -> Result<SimConfig, SimError> {
        let base = SimConfig {
            seed: self.seed,
            num_agents: self.num_agents,
            workers: self.workers,
            ..Default::default()
        };

        Ok(match scenario {
            ScenarioId::RandomGrouping => base,
            ScenarioId::CoordinatedGrouping => SimConfig {
                election: ElectionConfig::with_alternatives(8, 3)?
                    .with_policy(GroupingPolicy::Coordinated)
                    .with_join_threshold(3),
                ..base
            },
            ScenarioId::Contention => SimConfig {
                num_agents: (self.num_agents * 10).max(60),
                election: ElectionConfig::default().with_capacity(2),
                concurrent: true,
                ..base
            },
            ScenarioId::ApproximateRule => SimConfig {
                election: ElectionConfig::with_alternatives(12, 4)?.with_capacity(5),
                rule: RuleKind::LocalSearch,
                ..base
            },
            ScenarioId::SingletonGroups => SimConfig {
                election: ElectionConfig::default().with_capacity(1),
                ..base
            },
        })
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        match self.execute(scenario) {
            Ok(result) => result,
            Err(e) => {
                warn!("Scenario {} aborted: {}", scenario.name(), e);
                ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    failure_reason: Some(e.to_string()),
                    metrics: ScenarioMetrics::default(),
                    report: None,
                }
            }
        }
    }

    fn execute(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        let config = self.config(scenario)?;
        let mut world = SimWorld::new(config)?;

        world.spawn_agents()?;
        world.schedule_joins()?;
        let finalized_groups = world.finalize()?;
        let overall = world.submit_dissatisfaction()?;

        let mut metrics = collect_metrics(&world);
        metrics.finalized_groups = finalized_groups;
        metrics.mean_dissatisfaction = overall.mean;
        metrics.worst_dissatisfaction = overall.worst;

        let verdict = check_invariants(&world).and_then(|()| match scenario {
            ScenarioId::SingletonGroups => check_singletons(&world),
            ScenarioId::ApproximateRule => check_approximation(&world).map(|gap| {
                metrics.approximation_gap = gap;
            }),
            _ => Ok(()),
        });

        let failure_reason = verdict.err();
        let passed = failure_reason.is_none();

        let mut report = world.report(scenario.name());
        report.finalize(passed, failure_reason.clone());

        info!(
            "✓ {} complete: {} agents in {} groups, max worst case {}, mean dissatisfaction {:.3}",
            scenario.name(),
            metrics.agents,
            metrics.groups,
            metrics.max_worst_case,
            metrics.mean_dissatisfaction
        );

        Ok(ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            failure_reason,
            metrics,
            report: Some(report),
        })
    }
}

fn collect_metrics(world: &SimWorld) -> ScenarioMetrics {
    let groups = world.env.groups();
    let sizes: Vec<usize> = groups.iter().map(|g| g.members.len()).collect();
    ScenarioMetrics {
        agents: world.agents().len(),
        groups: groups.len(),
        largest_group: sizes.iter().copied().max().unwrap_or(0),
        mean_group_size: if groups.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<usize>() as f64 / groups.len() as f64
        },
        notifications: world.notifier.len(),
        max_worst_case: groups
            .iter()
            .filter_map(|g| g.outcome.as_ref().map(|o| o.worst_case))
            .max()
            .unwrap_or(0),
        ..Default::default()
    }
}

/// Ballots of a group's members, in join order.
fn member_ballots(world: &SimWorld, members: &[lightvote_env::AgentName]) -> Result<Vec<Ballot>, String> {
    members
        .iter()
        .map(|name| {
            world
                .env
                .agent(name)
                .map(|a| a.ballot().clone())
                .ok_or_else(|| format!("group member {} is not registered", name))
        })
        .collect()
}

/// Invariants every scenario must hold after finalization.
pub fn check_invariants(world: &SimWorld) -> Result<(), String> {
    let config = &world.config.election;
    let groups = world.env.groups();
    let agents = world.agents();

    let mut membership = BTreeMap::new();
    for group in &groups {
        if group.members.is_empty() || group.members.len() > config.capacity {
            return Err(format!(
                "{} has {} members (capacity {})",
                group.id,
                group.members.len(),
                config.capacity
            ));
        }
        if group.status != GroupStatus::Closed {
            return Err(format!("{} still open after finalization", group.id));
        }
        let outcome = group
            .outcome
            .as_ref()
            .ok_or_else(|| format!("{} closed without a committee", group.id))?;
        if outcome.committee.size() != config.committee_size {
            return Err(format!(
                "{} elected {} alternatives, expected {}",
                group.id,
                outcome.committee.size(),
                config.committee_size
            ));
        }

        let ballots = member_ballots(world, &group.members)?;
        let worst = worst_case_distance(&ballots, outcome.committee.members());
        if worst != outcome.worst_case {
            return Err(format!("{} reports worst case {} but ballots give {}", group.id, outcome.worst_case, worst));
        }
        if group.dissatisfaction.count != group.members.len() {
            return Err(format!(
                "{} chair has {} dissatisfaction reports for {} members",
                group.id,
                group.dissatisfaction.count,
                group.members.len()
            ));
        }

        for name in &group.members {
            if membership.insert(name.clone(), (group.id, outcome.committee.clone())).is_some() {
                return Err(format!("{} is a member of two groups", name));
            }
        }
    }

    for agent in agents {
        let (group, committee) = membership
            .get(agent.name())
            .ok_or_else(|| format!("{} was never placed", agent.name()))?;
        if agent.group() != Some(*group) {
            return Err(format!("{} believes it is in {:?}, listed in {}", agent.name(), agent.group(), group));
        }
        if !agent.has_voted() {
            return Err(format!("{} never voted", agent.name()));
        }
        if agent.committee() != Some(committee) {
            return Err(format!("{} did not receive its group's committee", agent.name()));
        }
    }
    if membership.len() != agents.len() {
        return Err(format!("{} members for {} agents", membership.len(), agents.len()));
    }

    let n_groups = groups.len();
    let expected = [
        (EventKind::GroupOpened, n_groups),
        (EventKind::AgentJoined, agents.len() - n_groups),
        (EventKind::CommitteeElected, n_groups),
    ];
    for (kind, count) in expected {
        let seen = world.notifier.count(kind);
        if seen != count {
            return Err(format!("{} notifications: saw {}, expected {}", kind, seen, count));
        }
    }
    if world.closures() != n_groups {
        return Err(format!("closure hook fired {} times for {} groups", world.closures(), n_groups));
    }

    Ok(())
}

/// Capacity 1: one group per agent, each committee as close to its ballot as `k` allows.
fn check_singletons(world: &SimWorld) -> Result<(), String> {
    let k = world.config.election.committee_size;
    let groups = world.env.groups();
    if groups.len() != world.agents().len() {
        return Err(format!("{} groups for {} agents", groups.len(), world.agents().len()));
    }
    for agent in world.agents() {
        let approved = agent.ballot().approvals().count_ones();
        let best = approved.abs_diff(k);
        let committee = agent.committee().ok_or_else(|| format!("{} has no committee", agent.name()))?;
        let distance = agent.ballot().distance(committee.members()).map_err(|e| e.to_string())?;
        if distance != best {
            return Err(format!("{} got distance {}, optimum is {}", agent.name(), distance, best));
        }
    }
    Ok(())
}

/// The configured rule may be worse than exact minimax, never better.
/// Returns the largest gap.
fn check_approximation(world: &SimWorld) -> Result<usize, String> {
    let k = world.config.election.committee_size;
    let exact = MinimaxApproval::new();
    let mut gap = 0;
    for group in world.env.groups() {
        let Some(outcome) = group.outcome.as_ref() else {
            continue;
        };
        let ballots = member_ballots(world, &group.members)?;
        let optimum = ElectionOutcome::elect(&exact, &ballots, k).map_err(|e| e.to_string())?;
        if outcome.worst_case < optimum.worst_case {
            return Err(format!(
                "{}: {} reached {} below the exact optimum {}",
                group.id, outcome.rule, outcome.worst_case, optimum.worst_case
            ));
        }
        gap = gap.max(outcome.worst_case - optimum.worst_case);
    }
    Ok(gap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_grouping_scenario() {
        let result = ScenarioRunner::new(42, 12).run(ScenarioId::RandomGrouping);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.agents, 12);
        assert!(result.metrics.groups >= 4);
        assert!(result.metrics.largest_group <= 3);
    }

    #[test]
    fn test_singleton_groups_scenario() {
        let result = ScenarioRunner::new(7, 8).run(ScenarioId::SingletonGroups);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.groups, 8);
        assert_eq!(result.metrics.finalized_groups, 0);
    }

    #[test]
    fn test_approximate_rule_scenario() {
        let result = ScenarioRunner::new(3, 15).run(ScenarioId::ApproximateRule);

        assert!(result.passed, "{:?}", result.failure_reason);
        let report = result.report.unwrap();
        assert!(report.groups.iter().all(|g| g.rule.as_deref() == Some("local_search")));
    }

    #[test]
    fn test_contention_scenario() {
        let result = ScenarioRunner::new(11, 6).with_workers(4).run(ScenarioId::Contention);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.agents, 60);
        assert!(result.metrics.largest_group <= 2);
    }

    #[test]
    fn test_sequential_scenarios_deterministic() {
        let first = ScenarioRunner::new(42, 9).run(ScenarioId::CoordinatedGrouping);
        let second = ScenarioRunner::new(42, 9).run(ScenarioId::CoordinatedGrouping);

        assert_eq!(first.metrics, second.metrics);
        assert_eq!(first.report, second.report);
    }
}
