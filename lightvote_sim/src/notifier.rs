//! Recording notifier: captures every notification the environment requests.

use lightvote_core::Notification;
use lightvote_env::{EventKind, Notifier};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// One captured notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedEvent {
    /// Position in the global delivery order, starting at 0
    pub sequence: u64,

    /// Event name, e.g. `group/opened`
    pub kind: String,

    pub payload: Notification,
}

/// Append-only log of notifications with per-kind counters.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    log: Mutex<Vec<RecordedEvent>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in delivery order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.log.lock().clone()
    }

    /// Events of a single kind, in delivery order.
    pub fn events_of(&self, kind: EventKind) -> Vec<RecordedEvent> {
        self.log
            .lock()
            .iter()
            .filter(|e| e.kind == kind.name())
            .cloned()
            .collect()
    }

    /// Number of events of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.log.lock().iter().filter(|e| e.kind == kind.name()).count()
    }

    /// Counts for every kind, including kinds never seen.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> =
            EventKind::all().iter().map(|k| (k.name().to_string(), 0)).collect();
        for event in self.log.lock().iter() {
            *counts.entry(event.kind.clone()).or_default() += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }
}

impl Notifier<Notification> for RecordingNotifier {
    fn notify(&self, kind: EventKind, payload: Notification) {
        let mut log = self.log.lock();
        let sequence = log.len() as u64;
        log.push(RecordedEvent {
            sequence,
            kind: kind.name().to_string(),
            payload,
        });
    }
}
