//! SimWorld - The simulation harness container.

use crate::context::SimContext;
use crate::error::SimError;
use crate::notifier::RecordingNotifier;
use crate::report::{GroupReport, SimReport};

use lightvote_core::{
    AgentHandle, AgentName, CoordinationEnvironment, DissatisfactionReport, ElectionConfig,
    JoinOutcome, RuleKind,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Number of agents to spawn
    pub num_agents: usize,

    /// Alternatives, committee size, capacity and default grouping policy
    pub election: ElectionConfig,

    /// Election rule run at every group closure
    pub rule: RuleKind,

    /// Schedule join requests in parallel instead of in agent order
    pub concurrent: bool,

    /// Worker threads for concurrent scheduling
    pub workers: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_agents: 6,
            election: ElectionConfig::default(),
            rule: RuleKind::Minimax,
            concurrent: false,
            workers: 4,
        }
    }
}

/// The SimWorld - container for the entire simulation.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Shared simulation context (seeded streams)
    pub context: Arc<SimContext>,

    /// Captures every notification the environment requests
    pub notifier: Arc<RecordingNotifier>,

    /// The system under test
    pub env: Arc<CoordinationEnvironment<SimContext>>,

    /// Agents in creation order
    agents: Vec<AgentHandle>,

    /// Placement decision per agent, in scheduling completion order
    placements: Vec<(AgentName, JoinOutcome)>,

    /// Closure hook invocations
    closures: Arc<AtomicUsize>,
}

impl SimWorld {
    /// Creates a new SimWorld with the given configuration.
    ///
    /// Fails before any agent exists if the election configuration is invalid.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let context = SimContext::shared(config.seed);
        let notifier = Arc::new(RecordingNotifier::new());

        let env = CoordinationEnvironment::new(config.election.clone(), Arc::clone(&context))?
            .with_rule(config.rule.build())
            .with_notifier(notifier.clone());

        let closures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closures);
        env.on_group_closed(move |id, outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
            debug!("  {} closed: committee {} (worst case {})", id, outcome.committee, outcome.worst_case);
        });

        Ok(Self {
            config,
            context,
            notifier,
            env: Arc::new(env),
            agents: Vec::new(),
            placements: Vec::new(),
            closures,
        })
    }

    /// Creates `num_agents` agents named `agent-{i}` with the configured
    /// default policy and threshold.
    pub fn spawn_agents(&mut self) -> Result<&[AgentHandle], SimError> {
        for i in 0..self.config.num_agents {
            let agent = self.env.create_default_agent(AgentName::indexed(i as u64))?;
            self.agents.push(agent);
        }
        info!("Spawned {} agents over {} alternatives", self.agents.len(), self.config.election.num_alternatives());
        Ok(&self.agents)
    }

    /// Runs the group-formation protocol for every agent.
    ///
    /// Sequential mode walks agents in creation order, which makes the
    /// outcome a pure function of the seed. Concurrent mode spins up a
    /// multi-thread tokio runtime and races all requests against each other.
    pub fn schedule_joins(&mut self) -> Result<&[(AgentName, JoinOutcome)], SimError> {
        if self.config.concurrent {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(self.config.workers.max(1))
                .build()?;
            let placements = runtime.block_on(Self::race_joins(Arc::clone(&self.env), self.agents.clone()))?;
            self.placements = placements;
        } else {
            for agent in &self.agents {
                let outcome = self.env.request_join_group(agent)?;
                self.placements.push((agent.name().clone(), outcome));
            }
        }
        Ok(&self.placements)
    }

    /// Async variant of concurrent scheduling for callers already inside a runtime.
    pub async fn schedule_joins_async(&mut self) -> Result<&[(AgentName, JoinOutcome)], SimError> {
        self.placements = Self::race_joins(Arc::clone(&self.env), self.agents.clone()).await?;
        Ok(&self.placements)
    }

    async fn race_joins(
        env: Arc<CoordinationEnvironment<SimContext>>,
        agents: Vec<AgentHandle>,
    ) -> Result<Vec<(AgentName, JoinOutcome)>, SimError> {
        let tasks: Vec<_> = agents
            .into_iter()
            .map(|agent| {
                let env = Arc::clone(&env);
                tokio::spawn(async move {
                    let outcome = env.request_join_group(&agent)?;
                    Ok::<_, SimError>((agent.name().clone(), outcome))
                })
            })
            .collect();

        let mut placements = Vec::with_capacity(tasks.len());
        for task in tasks {
            placements.push(task.await??);
        }
        Ok(placements)
    }

    /// Closes every group still open. Returns how many were closed.
    pub fn finalize(&self) -> Result<usize, SimError> {
        let closed = self.env.finalize()?;
        if !closed.is_empty() {
            debug!("Finalized {} partially filled groups", closed.len());
        }
        Ok(closed.len())
    }

    /// Every agent with a committee scores it and reports to its chair.
    pub fn submit_dissatisfaction(&self) -> Result<DissatisfactionReport, SimError> {
        let mut scores = Vec::with_capacity(self.agents.len());
        for agent in &self.agents {
            if let Some(committee) = agent.committee() {
                scores.push(self.env.submit_dissatisfaction(agent, committee)?);
            }
        }
        Ok(DissatisfactionReport::from_scores(&scores))
    }

    /// Full pipeline: spawn, schedule, finalize, score.
    pub fn run(&mut self) -> Result<DissatisfactionReport, SimError> {
        self.spawn_agents()?;
        self.schedule_joins()?;
        self.finalize()?;
        self.submit_dissatisfaction()
    }

    /// Agents in creation order.
    pub fn agents(&self) -> &[AgentHandle] {
        &self.agents
    }

    pub fn placements(&self) -> &[(AgentName, JoinOutcome)] {
        &self.placements
    }

    /// Number of times the closure hook fired.
    pub fn closures(&self) -> usize {
        self.closures.load(Ordering::SeqCst)
    }

    /// Builds the serializable summary of the current state.
    pub fn report(&self, scenario: &str) -> SimReport {
        let mut report = SimReport::new(scenario, self.config.clone());
        for snapshot in self.env.groups() {
            report.add_group(GroupReport::from_snapshot(&snapshot, &self.config.election.alternatives));
        }
        report.notifications = self.notifier.counts();
        report.closures = self.closures();
        report
    }
}
