//! LightVote Deterministic Simulation Harness
//!
//! This crate drives the voting core end to end the way an agent runtime
//! would: it creates agents, schedules their join requests, closes whatever
//! is left open, collects dissatisfaction and checks the invariants that
//! must hold afterwards.
//!
//! # Core Principle: One Seed
//!
//! All sources of non-determinism are controlled:
//! - **Randomness**: every agent's preferences and placement draws come from
//!   its own ChaCha8 stream derived from a single 64-bit seed
//! - **Scheduling**: sequential mode walks agents in creation order; concurrent
//!   mode deliberately gives that up to exercise the per-group locks
//! - **Notifications**: recorded in delivery order instead of sent anywhere
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ SimContext (seed ──► ChaCha8 stream per agent)       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                        │                            │
//! │  ┌────▼────┐              ┌────▼────┐                       │
//! │  │ agent-0 │  join/open   │ agent-1 │     ...               │
//! │  └────┬────┘              └────┬────┘                       │
//! │       ▼                        ▼                            │
//! │  ┌──────────────────────────────────┐                       │
//! │  │     CoordinationEnvironment      │──► RecordingNotifier  │
//! │  │  (groups, chairs, elections)     │                       │
//! │  └──────────────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lightvote_sim::{SimWorld, SimConfig};
//!
//! let config = SimConfig {
//!     seed: 42,
//!     num_agents: 6,
//!     ..Default::default()
//! };
//!
//! let mut world = SimWorld::new(config)?;
//! world.run()?;
//! let report = world.report("ad_hoc");
//! ```

mod context;
mod error;
mod notifier;
mod report;
mod runner;
mod world;
pub mod scenarios;

pub use context::SimContext;
pub use error::SimError;
pub use notifier::{RecordedEvent, RecordingNotifier};
pub use report::{GroupReport, SimReport};
pub use runner::{check_invariants, ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimWorld};
