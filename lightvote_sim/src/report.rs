//! JSON report of a simulation run.
//!
//! Written by `lightvote-sim --export` and compared byte-for-byte across
//! runs with the same seed.

use crate::world::SimConfig;
use lightvote_core::{AlternativeSet, Committee, DissatisfactionReport, GroupSnapshot, GroupStatus};
use lightvote_env::{AgentName, ChairName, GroupId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;

/// Outcome of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub id: GroupId,
    pub chair: ChairName,
    pub status: GroupStatus,

    /// Members in join order
    pub members: Vec<AgentName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee: Option<Committee>,

    /// Labels of the elected alternatives
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elected: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_case: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,

    pub dissatisfaction: DissatisfactionReport,
}

impl GroupReport {
    /// Builds a report entry, naming elected alternatives by label.
    pub fn from_snapshot(snapshot: &GroupSnapshot, alternatives: &AlternativeSet) -> Self {
        let outcome = snapshot.outcome.as_ref();
        Self {
            id: snapshot.id,
            chair: snapshot.chair.clone(),
            status: snapshot.status,
            members: snapshot.members.clone(),
            committee: outcome.map(|o| o.committee.clone()),
            elected: outcome
                .map(|o| {
                    alternatives
                        .describe(o.committee.members())
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            worst_case: outcome.map(|o| o.worst_case),
            rule: outcome.map(|o| o.rule.clone()),
            dissatisfaction: snapshot.dissatisfaction,
        }
    }
}

/// Complete simulation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimReport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    pub config: SimConfig,

    /// Groups ordered by id
    pub groups: Vec<GroupReport>,

    /// Notification counts by event name
    pub notifications: BTreeMap<String, usize>,

    /// Closure hook invocations
    pub closures: usize,

    /// All reported dissatisfaction across groups
    pub dissatisfaction: DissatisfactionReport,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimReport {
    /// Creates a new report container.
    pub fn new(scenario: &str, config: SimConfig) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed: config.seed,
            config,
            groups: Vec::new(),
            notifications: BTreeMap::new(),
            closures: 0,
            dissatisfaction: DissatisfactionReport::default(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a group and folds its dissatisfaction into the run total.
    pub fn add_group(&mut self, group: GroupReport) {
        let run = &mut self.dissatisfaction;
        let part = &group.dissatisfaction;
        if part.count > 0 {
            run.worst = if run.count == 0 { part.worst } else { run.worst.max(part.worst) };
            run.count += part.count;
            run.total += part.total;
            run.mean = run.total / run.count as f64;
        }
        self.groups.push(group);
    }

    /// Finalizes the report.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Total number of members over all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
