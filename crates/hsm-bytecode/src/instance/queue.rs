//! Per-tier event queues.
//!
//! Tier 64 holds a single event; an Interrupt may evict a non-Interrupt
//! occupant. Tiers 128 and 256 keep one slot reserved for Interrupt events
//! plus a FIFO ring for Normal and Low. Dequeue drains the interrupt slot
//! first. Ring cursors live in the instance header.

use crate::event::{EVENT_SIZE, EventPriority, HsmEvent};

use super::layout::{QUEUE_COUNT, QUEUE_HEAD, QUEUE_TAIL};
use super::{InstanceView, StatusFlags};

impl InstanceView<'_> {
    /// Queue `event` at `priority`. Returns false when it was dropped.
    pub fn enqueue(&mut self, event: HsmEvent, priority: EventPriority) -> bool {
        let event = event.with_priority(priority);
        let accepted = match self.layout().interrupt_offset {
            None => self.enqueue_single(event),
            Some(slot) if priority.is_interrupt() => self.enqueue_interrupt(slot, event),
            Some(_) => self.enqueue_ring(event),
        };
        if !accepted {
            self.insert_status(StatusFlags::QUEUE_DROPPED);
        }
        accepted
    }

    pub fn dequeue(&mut self) -> Option<HsmEvent> {
        let event = self.peek()?;
        if self.interrupt_pending() {
            self.remove_status(StatusFlags::INTERRUPT_OCCUPIED);
            return Some(event);
        }
        let cap = self.layout().ring_capacity;
        let bytes = self.bytes_mut();
        bytes[QUEUE_HEAD] = (bytes[QUEUE_HEAD] + 1) % cap;
        bytes[QUEUE_COUNT] -= 1;
        if bytes[QUEUE_COUNT] == 0 {
            bytes[QUEUE_HEAD] = 0;
            bytes[QUEUE_TAIL] = 0;
        }
        Some(event)
    }

    /// Next event `dequeue` would return.
    pub fn peek(&self) -> Option<HsmEvent> {
        if let Some(slot) = self.layout().interrupt_offset
            && self.interrupt_pending()
        {
            return Some(HsmEvent::from_bytes(&self.bytes()[slot..slot + EVENT_SIZE]));
        }
        if self.queue_count_raw() == 0 {
            return None;
        }
        let at = self.layout().ring_slot(self.bytes()[QUEUE_HEAD]);
        Some(HsmEvent::from_bytes(&self.bytes()[at..at + EVENT_SIZE]))
    }

    pub fn queue_count(&self) -> usize {
        self.queue_count_raw() as usize + usize::from(self.interrupt_pending())
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue_count() == 0
    }

    pub fn clear_queue(&mut self) {
        self.remove_status(StatusFlags::INTERRUPT_OCCUPIED);
        let bytes = self.bytes_mut();
        bytes[QUEUE_HEAD] = 0;
        bytes[QUEUE_TAIL] = 0;
        bytes[QUEUE_COUNT] = 0;
    }

    fn interrupt_pending(&self) -> bool {
        self.status().contains(StatusFlags::INTERRUPT_OCCUPIED)
    }

    fn enqueue_single(&mut self, event: HsmEvent) -> bool {
        let at = self.layout().ring_offset;
        if self.queue_count_raw() > 0 {
            let occupant = HsmEvent::from_bytes(&self.bytes()[at..at + EVENT_SIZE]);
            if !event.priority.is_interrupt() || occupant.priority.is_interrupt() {
                return false;
            }
        }
        let bytes = self.bytes_mut();
        event.write_to(&mut bytes[at..at + EVENT_SIZE]);
        bytes[QUEUE_COUNT] = 1;
        true
    }

    fn enqueue_interrupt(&mut self, slot: usize, event: HsmEvent) -> bool {
        if self.interrupt_pending() {
            return false;
        }
        event.write_to(&mut self.bytes_mut()[slot..slot + EVENT_SIZE]);
        self.insert_status(StatusFlags::INTERRUPT_OCCUPIED);
        true
    }

    fn enqueue_ring(&mut self, event: HsmEvent) -> bool {
        let cap = self.layout().ring_capacity;
        if self.queue_count_raw() >= cap {
            return false;
        }
        let tail = self.bytes()[QUEUE_TAIL];
        let at = self.layout().ring_slot(tail);
        let bytes = self.bytes_mut();
        event.write_to(&mut bytes[at..at + EVENT_SIZE]);
        bytes[QUEUE_TAIL] = (tail + 1) % cap;
        bytes[QUEUE_COUNT] += 1;
        true
    }
}
