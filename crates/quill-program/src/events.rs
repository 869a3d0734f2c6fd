use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use quill_types::{Address, Identity};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

/// Lifecycle label of a [`NoteEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NoteLabel {
    Create,
    Delete,
}

/// Action carried by a [`LikeEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LikeAction {
    Like,
}

/// Action carried by a [`SaveEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SaveAction {
    Save,
}

/// A note was created or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub label: NoteLabel,
    pub note_address: Address,
    pub creator: Identity,
    pub is_private: bool,
    pub title: String,
}

/// A note was liked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEvent {
    pub note_address: Address,
    pub user: Identity,
    pub action: LikeAction,
    /// Like count after this like.
    pub like_count: u64,
}

/// A note was saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEvent {
    pub note_address: Address,
    pub user: Identity,
    pub action: SaveAction,
}

/// Classification of program events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NoteCreated,
    NoteDeleted,
    Liked,
    Saved,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoteCreated => "NoteCreated",
            Self::NoteDeleted => "NoteDeleted",
            Self::Liked => "Liked",
            Self::Saved => "Saved",
        };
        f.write_str(s)
    }
}

/// Notification emitted after a transition commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ProgramEvent {
    Note(NoteEvent),
    Like(LikeEvent),
    Save(SaveEvent),
}

impl ProgramEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Note(e) if e.label == NoteLabel::Create => EventKind::NoteCreated,
            Self::Note(_) => EventKind::NoteDeleted,
            Self::Like(_) => EventKind::Liked,
            Self::Save(_) => EventKind::Saved,
        }
    }

    pub fn note_address(&self) -> &Address {
        match self {
            Self::Note(e) => &e.note_address,
            Self::Like(e) => &e.note_address,
            Self::Save(e) => &e.note_address,
        }
    }
}

impl From<NoteEvent> for ProgramEvent {
    fn from(event: NoteEvent) -> Self {
        Self::Note(event)
    }
}

impl From<LikeEvent> for ProgramEvent {
    fn from(event: LikeEvent) -> Self {
        Self::Like(event)
    }
}

impl From<SaveEvent> for ProgramEvent {
    fn from(event: SaveEvent) -> Self {
        Self::Save(event)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Filter for subscribing to a subset of program events.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<EventKind>>,
    /// If set, only events about these notes are delivered.
    pub notes: Option<Vec<Address>>,
}

impl EventFilter {
    /// Filter matching every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching events about a single note.
    pub fn note(address: Address) -> Self {
        Self {
            kinds: None,
            notes: Some(vec![address]),
        }
    }

    /// Returns `true` if the given event matches this filter.
    pub fn matches(&self, event: &ProgramEvent) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind()) {
                return false;
            }
        }
        if let Some(ref notes) = self.notes {
            if !notes.contains(event.note_address()) {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for program events.
pub type EventStream = broadcast::Receiver<ProgramEvent>;

struct Subscriber {
    filter: EventFilter,
    sender: broadcast::Sender<ProgramEvent>,
}

/// Fan-out of committed events to subscribers, plus a bounded history.
///
/// Emission never fails: a subscriber that dropped its receiver is pruned,
/// and a lagging subscriber loses the oldest events of its own channel.
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    history: Mutex<VecDeque<ProgramEvent>>,
    channel_capacity: usize,
    history_capacity: usize,
}

impl EventBus {
    pub fn new(channel_capacity: usize, history_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: Mutex::new(VecDeque::with_capacity(history_capacity)),
            channel_capacity: channel_capacity.max(1),
            history_capacity,
        }
    }

    /// Register a subscriber. Only events emitted after this call are delivered.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        let (sender, receiver) = broadcast::channel(self.channel_capacity);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { filter, sender });
        receiver
    }

    /// Record an event and deliver it to every matching subscriber.
    pub fn emit(&self, event: ProgramEvent) {
        {
            let mut history = self.history_lock();
            if self.history_capacity > 0 {
                if history.len() == self.history_capacity {
                    history.pop_front();
                }
                history.push_back(event.clone());
            }
        }

        let mut subs = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subs.retain(|sub| {
            if sub.filter.matches(&event) {
                // If send fails (no receivers), the subscriber is stale.
                sub.sender.send(event.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
        debug!(kind = %event.kind(), note = %event.note_address().short_hex(), "event emitted");
    }

    /// The most recent events, oldest first.
    pub fn history(&self) -> Vec<ProgramEvent> {
        self.history_lock().iter().cloned().collect()
    }

    /// Current number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn history_lock(&self) -> MutexGuard<'_, VecDeque<ProgramEvent>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256, 1024)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("history_capacity", &self.history_capacity)
            .finish()
    }
}
