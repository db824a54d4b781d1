//! Sequence-tagged storage for one fetch target.
//!
//! Every request takes a [`Ticket`] from its slot before suspending. When the
//! response arrives it is applied only if that ticket is still the newest one
//! issued; older responses are dropped no matter the order they land in.

use parking_lot::RwLock;

/// Sequence number handed out by [`RequestSlot::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The response was stored and is now visible to readers.
    Applied(T),
    /// A newer request was issued for the same slot; the response was dropped.
    Superseded,
}

impl<T> Fetched<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Fetched::Applied(value) => Some(value),
            Fetched::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Fetched::Superseded)
    }
}

#[derive(Debug)]
struct SlotState<T> {
    value: Option<T>,
    issued: u64,
    /// Number of values applied so far.
    version: u64,
}

#[derive(Debug)]
pub struct RequestSlot<T> {
    state: RwLock<SlotState<T>>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SlotState {
                value: None,
                issued: 0,
                version: 0,
            }),
        }
    }

    /// Issues a new ticket, superseding every ticket issued before it.
    pub fn begin(&self) -> Ticket {
        let mut state = self.state.write();
        state.issued += 1;
        Ticket(state.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.state.read().issued == ticket.0
    }

    /// Stores `value` if `ticket` is still current. Returns whether it was applied.
    pub fn complete(&self, ticket: Ticket, value: T) -> bool {
        let mut state = self.state.write();
        if state.issued != ticket.0 {
            return false;
        }
        state.value = Some(value);
        state.version += 1;
        true
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().value.is_none()
    }
}

impl<T: Clone> RequestSlot<T> {
    pub fn get(&self) -> Option<T> {
        self.state.read().value.clone()
    }
}
