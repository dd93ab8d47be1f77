use crate::event::{EventPriority, HsmEvent};

use super::{Instance64, Instance128, Instance256, InstanceStorage, StatusFlags};

fn ev(id: u16) -> HsmEvent {
    HsmEvent::new(id)
}

#[test]
fn tier64_interrupt_replaces_normal() {
    let mut instance = Instance64::new(1, 0);
    let mut view = instance.view();

    assert!(view.enqueue(ev(10), EventPriority::Normal));
    assert!(view.enqueue(ev(11), EventPriority::Interrupt));
    assert_eq!(view.queue_count(), 1);

    let out = view.dequeue().unwrap();
    assert_eq!(out.id, 11);
    assert_eq!(out.priority, EventPriority::Interrupt);
    assert!(view.dequeue().is_none());
}

#[test]
fn tier64_second_normal_dropped() {
    let mut instance = Instance64::new(1, 0);
    let mut view = instance.view();

    assert!(view.enqueue(ev(10), EventPriority::Normal));
    assert!(!view.enqueue(ev(12), EventPriority::Normal));
    assert!(view.status().contains(StatusFlags::QUEUE_DROPPED));
    assert_eq!(view.peek().map(|e| e.id), Some(10));
}

#[test]
fn tier64_interrupt_not_evicted() {
    let mut instance = Instance64::new(1, 0);
    let mut view = instance.view();

    assert!(view.enqueue(ev(10), EventPriority::Interrupt));
    assert!(!view.enqueue(ev(11), EventPriority::Interrupt));
    assert!(!view.enqueue(ev(12), EventPriority::Low));
    assert_eq!(view.dequeue().map(|e| e.id), Some(10));
}

#[test]
fn hybrid_drains_interrupt_first() {
    let mut instance = Instance256::new(1, 0);
    let mut view = instance.view();

    assert!(view.enqueue(ev(2), EventPriority::Normal));
    assert!(view.enqueue(ev(3), EventPriority::Low));
    assert!(view.enqueue(ev(4), EventPriority::Interrupt));
    assert_eq!(view.queue_count(), 3);

    let order: Vec<u16> = std::iter::from_fn(|| view.dequeue()).map(|e| e.id).collect();
    assert_eq!(order, vec![4, 2, 3]);
    assert!(view.queue_is_empty());
}

#[test]
fn hybrid_interrupt_slot_is_exclusive() {
    let mut instance = Instance128::new(1, 0);
    let mut view = instance.view();

    assert!(view.enqueue(ev(2), EventPriority::Interrupt));
    assert!(!view.enqueue(ev(3), EventPriority::Interrupt));
    // The ring still has room for a normal event.
    assert!(view.enqueue(ev(4), EventPriority::Normal));
    assert!(!view.enqueue(ev(5), EventPriority::Normal));
    assert_eq!(view.queue_count(), 2);
}

#[test]
fn ring_wraps_fifo() {
    let mut instance = Instance256::new(1, 0);
    let mut view = instance.view();

    for id in 2..7 {
        assert!(view.enqueue(ev(id), EventPriority::Normal));
    }
    assert!(!view.enqueue(ev(7), EventPriority::Normal));

    assert_eq!(view.dequeue().map(|e| e.id), Some(2));
    assert_eq!(view.dequeue().map(|e| e.id), Some(3));
    assert!(view.enqueue(ev(8), EventPriority::Normal));
    assert!(view.enqueue(ev(9), EventPriority::Low));

    let order: Vec<u16> = std::iter::from_fn(|| view.dequeue()).map(|e| e.id).collect();
    assert_eq!(order, vec![4, 5, 6, 8, 9]);
}

#[test]
fn clear_empties_everything() {
    let mut instance = Instance128::new(1, 0);
    let mut view = instance.view();
    view.enqueue(ev(2), EventPriority::Interrupt);
    view.enqueue(ev(3), EventPriority::Normal);

    view.clear_queue();

    assert_eq!(view.queue_count(), 0);
    assert!(view.peek().is_none());
    assert!(view.enqueue(ev(4), EventPriority::Interrupt));
}

#[test]
fn payload_survives_queue() {
    let mut instance = Instance64::new(1, 0);
    let mut view = instance.view();
    let event = ev(9).with_timestamp(1000).with_payload(b"hello").unwrap();

    view.enqueue(event, EventPriority::Low);

    let out = view.dequeue().unwrap();
    assert_eq!(out.timestamp, 1000);
    assert_eq!(&out.payload[..5], b"hello");
    assert_eq!(out.priority, EventPriority::Low);
}
