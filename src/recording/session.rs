//! Recording session state

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::model::Item;

/// Recorder lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session; the next traffic request starts one
    Idle,
    /// Buffering exchanges
    Recording,
}

/// Buffer of recorded items plus the session start time
///
/// A session is recording exactly when a start time is set.
#[derive(Debug, Default)]
pub struct Session {
    started_at: Option<DateTime<Utc>>,
    items: Vec<Item>,
}

impl Session {
    /// Create an idle session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.started_at.is_some() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    /// Whether a session is active
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.started_at.is_some()
    }

    /// Session start time, if recording
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Recorded items in order
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of recorded items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Start recording if idle. Returns `true` if a new session began.
    pub fn start_if_idle(&mut self) -> bool {
        if self.is_recording() {
            return false;
        }
        self.started_at = Some(Utc::now());
        true
    }

    /// Append an item, starting a session if needed
    pub fn push(&mut self, item: Item) {
        self.start_if_idle();
        self.items.push(item);
    }

    /// Append an item only if the session that started at `started_at` is
    /// still the active one. Returns `false` and drops the item otherwise.
    pub fn push_if_current(&mut self, started_at: DateTime<Utc>, item: Item) -> bool {
        if self.started_at != Some(started_at) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Clear the buffer and re-stamp the start time.
    ///
    /// Returns `false` without touching anything if no session is active.
    /// The new start time is strictly later than the previous one.
    pub fn reset(&mut self) -> bool {
        let Some(previous) = self.started_at else {
            return false;
        };

        let now = Utc::now();
        let next = if now > previous {
            now
        } else {
            previous + Duration::nanoseconds(1)
        };

        self.items.clear();
        self.started_at = Some(next);
        true
    }

    /// End the session and return to idle
    pub fn finish(&mut self) {
        self.items.clear();
        self.started_at = None;
    }
}

/// Collection name for a session started at `started_at`
#[must_use]
pub fn session_name(started_at: DateTime<Utc>) -> String {
    started_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
