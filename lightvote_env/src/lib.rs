//! LightVote Environment Abstraction Layer
//!
//! This crate provides the seams between the voting core and the outside world,
//! allowing the same grouping and election code to run in both **Production**
//! (OS entropy, tokio broadcast fan-out) and **Simulation** (seeded RNG,
//! recorded notifications) environments.
//!
//! # Core Concept: Injected Effects
//!
//! The core never reaches for global state. Everything non-deterministic or
//! outward-facing is handed to it:
//! - Randomness (`VotingContext::derive_rng()`)
//! - Event delivery (`Notifier::notify()`)
//! - Identities (`AgentName`, `ChairName`, `GroupId`)
//!
//! By deriving all entropy from a single 64-bit seed, any grouping outcome
//! becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use lightvote_env::{VotingContext, Notifier, EventKind};
//!
//! fn place<Ctx: VotingContext, N: Notifier<String>>(ctx: &Ctx, notifier: &N) {
//!     let mut rng = ctx.derive_rng(7);
//!     // ... pick a group using rng ...
//!     notifier.notify(EventKind::AgentJoined, "agent-7".to_string());
//! }
//! ```

mod context;
mod notifier;
mod types;
mod error;
mod system_impl;

pub use context::VotingContext;
pub use notifier::{EventKind, Notifier, NullNotifier, BroadcastNotifier, Subscription};
pub use types::{AgentName, ChairName, GroupId};
pub use error::EnvError;
pub use system_impl::SystemContext;
