//! Core environment context trait for LightVote agents.

use rand::RngCore;

/// The central interface for randomness injection.
///
/// Preference generation and random group assignment both draw from RNGs
/// handed out by this trait, never from a global generator.
///
/// # Implementations
///
/// - **Production**: `SystemContext` - fresh `StdRng` from OS entropy per stream
/// - **Simulation**: `SimContext` - `ChaCha8Rng` derived from `(seed, stream)`
///
/// # Determinism
///
/// A simulation implementation must return the same RNG state for the same
/// `(seed, stream)` pair, independent of call order, so that adding or
/// reordering agents never perturbs another agent's draws.
pub trait VotingContext: Send + Sync + 'static {
    /// The RNG type handed out per stream.
    type Rng: RngCore + Send;
    
    /// Derives an independent random stream.
    ///
    /// # Arguments
    /// * `stream` - A value to combine with the global seed (e.g. agent index)
    fn derive_rng(&self, stream: u64) -> Self::Rng;
    
    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
