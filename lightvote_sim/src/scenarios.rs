//! Simulation scenarios for the grouping protocol and the election.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// LV-001: random placement, default parameters
    RandomGrouping,

    /// LV-002: placement by ballot similarity
    CoordinatedGrouping,

    /// LV-003: many agents racing for small groups
    Contention,

    /// LV-004: local-search election checked against the exact rule
    ApproximateRule,

    /// LV-005: capacity 1, every agent elects for itself
    SingletonGroups,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::RandomGrouping,
            ScenarioId::CoordinatedGrouping,
            ScenarioId::Contention,
            ScenarioId::ApproximateRule,
            ScenarioId::SingletonGroups,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::RandomGrouping => "random_grouping",
            ScenarioId::CoordinatedGrouping => "coordinated_grouping",
            ScenarioId::Contention => "contention",
            ScenarioId::ApproximateRule => "approximate_rule",
            ScenarioId::SingletonGroups => "singleton_groups",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::RandomGrouping => "Random placement, m=6 k=2 capacity 3, sequential",
            ScenarioId::CoordinatedGrouping => "Closest-proxy placement with threshold 3, m=8 k=3",
            ScenarioId::Contention => "10x agents joining concurrently into groups of 2",
            ScenarioId::ApproximateRule => "Local search on m=12 k=4, never better than exact minimax",
            ScenarioId::SingletonGroups => "Capacity 1: one group and one election per agent",
        }
    }

    /// Returns true if the scenario schedules joins in parallel.
    pub fn is_concurrent(&self) -> bool {
        matches!(self, ScenarioId::Contention)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random_grouping" | "random" | "lv-001" => Ok(ScenarioId::RandomGrouping),
            "coordinated_grouping" | "coordinated" | "lv-002" => Ok(ScenarioId::CoordinatedGrouping),
            "contention" | "lv-003" => Ok(ScenarioId::Contention),
            "approximate_rule" | "approximate" | "lv-004" => Ok(ScenarioId::ApproximateRule),
            "singleton_groups" | "singleton" | "lv-005" => Ok(ScenarioId::SingletonGroups),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
