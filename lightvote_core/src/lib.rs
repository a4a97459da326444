//! LightVote Core - Decentralized Committee Selection by Approval Voting
//!
//! This library ties together three pieces that only make sense as a unit:
//! 1. **Preferences**: synthetic cardinal preferences, thresholded into approval ballots
//! 2. **Grouping**: capacity-bounded group formation, random or coordinated by ballot similarity
//! 3. **Election**: Minimax Approval Voting over each closed group's ballots
//!
//! The `CoordinationEnvironment` is the only mutable shared state. Every group
//! is its own serialization point, so concurrent join requests contend only on
//! the group they target.

pub mod error;
pub mod ballot;
pub mod alternatives;
pub mod preference;
pub mod dissatisfaction;
pub mod election;
pub mod config;
pub mod agent;
pub mod group;
pub mod grouping;
pub mod environment;

// Re-export key types for convenience
pub use error::VotingError;
pub use ballot::{ApprovalVector, Ballot, Committee};
pub use alternatives::AlternativeSet;
pub use preference::{PreferenceModel, PreferenceVector};
pub use dissatisfaction::DissatisfactionReport;
pub use election::{ElectionOutcome, ElectionRule, LocalSearchMinimax, MinimaxApproval, RuleKind};
pub use config::ElectionConfig;
pub use agent::{AgentHandle, VotingAgent};
pub use group::{Chair, Group, GroupSnapshot, GroupStatus};
pub use grouping::{GroupingPolicy, Placement};
pub use environment::{CoordinationEnvironment, GroupClosedHook, JoinOutcome, Notification};

pub use lightvote_env::{AgentName, ChairName, EventKind, GroupId};
