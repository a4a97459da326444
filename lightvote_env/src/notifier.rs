//! Notification abstraction for LightVote agents.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Kinds of state change the core reports to the agent runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// A new group was opened by its founding agent
    GroupOpened,
    
    /// An agent was admitted into an existing group
    AgentJoined,
    
    /// A group closed and its chair elected a committee
    CommitteeElected,
}

impl EventKind {
    /// Returns all event kinds.
    pub fn all() -> [EventKind; 3] {
        [EventKind::GroupOpened, EventKind::AgentJoined, EventKind::CommitteeElected]
    }
    
    /// Returns the event name as seen by agent plans.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::GroupOpened => "group/opened",
            EventKind::AgentJoined => "group/joined",
            EventKind::CommitteeElected => "committee/elected",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Abstraction for event fan-out to every registered agent.
///
/// # Implementations
///
/// - **Production**: `BroadcastNotifier` - tokio broadcast channel, one receiver per agent
/// - **Simulation**: `RecordingNotifier` - ordered in-memory log
///
/// # Ordering
///
/// ```text
/// Environment                Notifier                 Agents
///   |-- state change            |                        |
///   |-- notify(kind, payload) ->|                        |
///   |                           |-- [delivery] --------->|-- handle event
/// ```
///
/// The core calls `notify` only after the state change it reports is
/// visible. When subscribers process the event is up to the implementation.
pub trait Notifier<P>: Send + Sync + 'static {
    /// Requests delivery of an event to all registered agents.
    fn notify(&self, kind: EventKind, payload: P);
}

/// Notifier that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl<P> Notifier<P> for NullNotifier {
    fn notify(&self, _kind: EventKind, _payload: P) {}
}

/// Production notifier fanning events out over a tokio broadcast channel.
pub struct BroadcastNotifier<P> {
    tx: broadcast::Sender<(EventKind, P)>,
}

impl<P: Clone + Send + 'static> BroadcastNotifier<P> {
    /// Creates a notifier buffering up to `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }
    
    /// Registers a new subscriber. It sees only events sent after this call.
    pub fn subscribe(&self) -> Subscription<P> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
    
    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<P: Clone + Send + Sync + 'static> Notifier<P> for BroadcastNotifier<P> {
    fn notify(&self, kind: EventKind, payload: P) {
        // No subscribers is not an error
        let _ = self.tx.send((kind, payload));
    }
}

/// Receiving end of a `BroadcastNotifier`.
pub struct Subscription<P> {
    rx: broadcast::Receiver<(EventKind, P)>,
}

impl<P: Clone> Subscription<P> {
    /// Waits for the next event.
    ///
    /// # Returns
    /// * `Ok((kind, payload))` - An event was delivered
    /// * `Err(EnvError::Lagged)` - Events were dropped; the next call resumes
    /// * `Err(EnvError::ChannelClosed)` - The notifier was dropped
    pub async fn recv(&mut self) -> Result<(EventKind, P), EnvError> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EnvError::ChannelClosed,
            broadcast::error::RecvError::Lagged(n) => EnvError::Lagged(n),
        })
    }
    
    /// Returns the next buffered event without waiting, if any.
    pub fn try_recv(&mut self) -> Option<(EventKind, P)> {
        self.rx.try_recv().ok()
    }
}
