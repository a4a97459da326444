//! Error types for the LightVote environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// Every sender of the notification channel was dropped
    #[error("Notification channel closed")]
    ChannelClosed,
    
    /// The subscriber fell behind and missed notifications
    #[error("Subscriber lagged behind by {0} notifications")]
    Lagged(u64),
}
