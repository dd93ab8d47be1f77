//! Runtime event record (24 bytes).
//!
//! - 0-1: event id
//! - 2: priority
//! - 3: flags
//! - 4-7: timestamp
//! - 8-23: inline payload

use crate::codec::{read_u16, read_u32, write_u16, write_u32};

pub const EVENT_SIZE: usize = 24;
pub const PAYLOAD_SIZE: usize = 16;

/// Queue priority. Interrupt events get a dedicated slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
    Low = 0,
    #[default]
    Normal = 1,
    Interrupt = 2,
}

impl EventPriority {
    /// Unknown encodings decode as `Normal`.
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Low,
            2 => Self::Interrupt,
            _ => Self::Normal,
        }
    }

    pub fn is_interrupt(self) -> bool {
        self == Self::Interrupt
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventFlags(u8);

impl EventFlags {
    /// Postponed once: re-enqueued instead of processed on dequeue.
    pub const DEFERRED: Self = Self(1 << 0);
    /// Payload holds an out-of-band id rather than inline data.
    pub const BY_REFERENCE: Self = Self(1 << 1);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HsmEvent {
    pub id: u16,
    pub priority: EventPriority,
    pub flags: EventFlags,
    pub timestamp: u32,
    pub payload: [u8; PAYLOAD_SIZE],
}

impl HsmEvent {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Copy `data` into the inline payload. Returns `None` when it does not
    /// fit; such payloads must travel by reference.
    pub fn with_payload(mut self, data: &[u8]) -> Option<Self> {
        if data.len() > PAYLOAD_SIZE {
            return None;
        }
        self.payload = [0; PAYLOAD_SIZE];
        self.payload[..data.len()].copy_from_slice(data);
        Some(self)
    }

    /// Store an out-of-band payload handle and mark the event by-reference.
    pub fn with_reference(mut self, handle: u32) -> Self {
        self.payload = [0; PAYLOAD_SIZE];
        write_u32(&mut self.payload, 0, handle);
        self.flags.insert(EventFlags::BY_REFERENCE);
        self
    }

    pub fn reference(&self) -> Option<u32> {
        self.flags
            .contains(EventFlags::BY_REFERENCE)
            .then(|| read_u32(&self.payload, 0))
    }

    /// Reserved "timer fired" event for `slot`, owned by `state`.
    pub fn timer(slot: u16, state: u16) -> Self {
        let mut event = Self::new(hsm_core::EVENT_TIMER);
        write_u16(&mut event.payload, 0, slot);
        write_u16(&mut event.payload, 2, state);
        event
    }

    /// `(slot, owning state)` for timer events.
    pub fn timer_source(&self) -> Option<(u16, u16)> {
        (self.id == hsm_core::EVENT_TIMER)
            .then(|| (read_u16(&self.payload, 0), read_u16(&self.payload, 2)))
    }

    pub fn is_deferred(&self) -> bool {
        self.flags.contains(EventFlags::DEFERRED)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= EVENT_SIZE, "event record too short");
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(&bytes[8..EVENT_SIZE]);
        Self {
            id: read_u16(bytes, 0),
            priority: EventPriority::from_u8(bytes[2]),
            flags: EventFlags::from_bits(bytes[3]),
            timestamp: read_u32(bytes, 4),
            payload,
        }
    }

    pub fn write_to(&self, bytes: &mut [u8]) {
        assert!(bytes.len() >= EVENT_SIZE, "event slot too short");
        write_u16(bytes, 0, self.id);
        bytes[2] = self.priority as u8;
        bytes[3] = self.flags.bits();
        write_u32(bytes, 4, self.timestamp);
        bytes[8..EVENT_SIZE].copy_from_slice(&self.payload);
    }

    pub fn to_bytes(&self) -> [u8; EVENT_SIZE] {
        let mut b = [0u8; EVENT_SIZE];
        self.write_to(&mut b);
        b
    }
}
