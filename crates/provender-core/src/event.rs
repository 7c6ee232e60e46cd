//! Typed device events.
//!
//! The core raises no log output; notable outcomes are recorded as events
//! in a bounded per-device log the host drains when it pleases.

use crate::fixed::{Fixed64, Ticks};
use crate::id::MaterialKindId;
use std::collections::VecDeque;

/// A device event. All events carry the rare tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw material was pulled in and converted into reserve.
    MaterialPulled {
        kind: MaterialKindId,
        units: u32,
        stat_per_unit: Fixed64,
        tick: Ticks,
    },
    /// A whole output unit left the reserve.
    ItemDispensed {
        kind: MaterialKindId,
        remaining_units: u32,
        tick: Ticks,
    },
    /// A dispense was requested with nothing available. Callers are
    /// expected to check availability first, so this marks a caller-side
    /// logic fault; worth surfacing, not fatal.
    DispenseUnavailable { tick: Ticks },
    /// Reserve, pull power, and provenance were cleared.
    DeviceReset { tick: Ticks },
}

/// Discriminant tag for event types, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MaterialPulled,
    ItemDispensed,
    DispenseUnavailable,
    DeviceReset,
}

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MaterialPulled { .. } => EventKind::MaterialPulled,
            Event::ItemDispensed { .. } => EventKind::ItemDispensed,
            Event::DispenseUnavailable { .. } => EventKind::DispenseUnavailable,
            Event::DeviceReset { .. } => EventKind::DeviceReset,
        }
    }
}

/// Bounded event buffer. Once full, the oldest entries are dropped and
/// counted, so an undrained device never grows without bound.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
    dropped: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Take all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events lost to the capacity bound since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
