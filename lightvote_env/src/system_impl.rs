//! Production implementation of VotingContext using OS entropy.

use crate::VotingContext;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Production context backed by OS entropy.
///
/// Every derived stream is freshly seeded, so nothing about one agent's
/// draws can be inferred from another's.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemContext;

impl SystemContext {
    /// Creates a new SystemContext.
    pub fn new() -> Self {
        Self
    }
    
    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl VotingContext for SystemContext {
    type Rng = StdRng;
    
    fn derive_rng(&self, _stream: u64) -> StdRng {
        StdRng::from_entropy()
    }
    
    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}
