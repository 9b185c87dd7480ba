//! Attack events and the open-event arena
//!
//! Events are stored in a fixed-size arena with one slot per attackable
//! line, indexed by the line's position in the configured line set. A slot
//! holds at most one open event, which is exactly the one-open-event-per-line
//! invariant.

use serde::{Deserialize, Serialize};

/// Identifier of a power line, e.g. `"48_50_136"`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub String);

impl LineId {
    /// Creates a new `LineId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for LineId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One attack on one line, from activation until it resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackEvent {
    /// Attacked line.
    pub line: LineId,
    /// Step at which the line went under attack. Also the only step at
    /// which an alert counts for this event.
    pub activation_step: u64,
    /// Whether an alert for this line was raised at `activation_step`.
    pub alert_seen: bool,
    /// Steps elapsed since activation.
    pub age: u32,
}

impl AttackEvent {
    /// Creates a fresh event.
    #[must_use]
    pub const fn new(line: LineId, activation_step: u64, alert_seen: bool) -> Self {
        Self {
            line,
            activation_step,
            alert_seen,
            age: 0,
        }
    }
}

/// Arena of open events, one slot per attackable line.
#[derive(Debug, Clone, Default)]
pub struct OpenEvents {
    slots: Vec<Option<AttackEvent>>,
    len: usize,
}

impl OpenEvents {
    /// Creates an empty arena with `capacity` slots.
    #[must_use]
    pub fn with_slots(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            len: 0,
        }
    }

    /// Number of open events.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no event is open.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the open event in `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&AttackEvent> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Opens `event` in `slot`.
    ///
    /// Returns the event back if the slot is already occupied or out of range.
    pub fn open(&mut self, slot: usize, event: AttackEvent) -> Result<(), AttackEvent> {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_none() => {
                *entry = Some(event);
                self.len += 1;
                Ok(())
            }
            _ => Err(event),
        }
    }

    /// Closes and returns the event in `slot`.
    pub fn close(&mut self, slot: usize) -> Option<AttackEvent> {
        let event = self.slots.get_mut(slot).and_then(Option::take);
        if event.is_some() {
            self.len -= 1;
        }
        event
    }

    /// Iterates over `(slot, event)` for every open event, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AttackEvent)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.as_ref().map(|e| (slot, e)))
    }

    /// Mutable counterpart of [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut AttackEvent)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, e)| e.as_mut().map(|e| (slot, e)))
    }

    /// Closes every event.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.len = 0;
    }
}
