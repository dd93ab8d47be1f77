use hsm_bytecode::{EventPriority, HsmEvent};

use super::{ActionKind, RECORD_SIZE, TraceBuffer, TraceLevel, TraceOpcode, TraceRecord, Tracer};

fn states(buffer: &TraceBuffer) -> Vec<u16> {
    buffer.records().map(|r| r.args[0]).collect()
}

#[test]
fn records_come_back_oldest_first() {
    let mut buffer = TraceBuffer::new(4, TraceLevel::TIER1);
    for state in 1..=3 {
        buffer.trace_enter(0, state);
    }

    assert_eq!(buffer.len(), 3);
    assert_eq!(states(&buffer), [1, 2, 3]);
    assert_eq!(buffer.overwritten(), 0);
}

#[test]
fn full_ring_overwrites_oldest() {
    let mut buffer = TraceBuffer::new(4, TraceLevel::TIER1);
    for state in 1..=10 {
        buffer.trace_enter(0, state);
    }

    assert_eq!(buffer.len(), 4);
    assert_eq!(states(&buffer), [7, 8, 9, 10]);
    assert_eq!(buffer.overwritten(), 6);
}

#[test]
fn clear_empties_ring() {
    let mut buffer = TraceBuffer::new(2, TraceLevel::TIER1);
    for state in 1..=5 {
        buffer.trace_enter(0, state);
    }
    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.overwritten(), 0);

    buffer.trace_exit(0, 9);
    assert_eq!(states(&buffer), [9]);
}

#[test]
fn zero_capacity_holds_one_record() {
    let mut buffer = TraceBuffer::new(0, TraceLevel::TIER1);
    buffer.trace_enter(0, 1);
    buffer.trace_enter(0, 2);
    assert_eq!(buffer.capacity(), 1);
    assert_eq!(states(&buffer), [2]);
}

#[test]
fn level_filters_by_tier() {
    let mut buffer = TraceBuffer::new(16, TraceLevel::TIER1);
    buffer.trace_enter(0, 1);
    buffer.trace_action(0, ActionKind::Entry, 0x0b60, 1);
    buffer.trace_guard(0, 0x1234, 5, true);
    assert_eq!(buffer.len(), 1);

    buffer.set_level(TraceLevel::TIER2.union(TraceLevel::TIER3));
    buffer.trace_enter(0, 2);
    buffer.trace_timer_fired(0, 0, 2);
    buffer.trace_activity(0, 0x0c23, 2);

    let opcodes: Vec<_> = buffer.records().map(|r| r.opcode).collect();
    assert_eq!(
        opcodes,
        [
            TraceOpcode::Enter,
            TraceOpcode::TimerFired,
            TraceOpcode::Activity
        ]
    );
}

#[test]
fn empty_level_records_nothing() {
    let mut buffer = TraceBuffer::new(4, TraceLevel::empty());
    buffer.trace_rtc_overflow(0, 100);
    assert!(buffer.is_empty());
}

#[test]
fn up_to_accumulates_tiers() {
    assert_eq!(TraceLevel::up_to(0), TraceLevel::TIER1);
    assert_eq!(TraceLevel::up_to(1), TraceLevel::TIER1);
    assert_eq!(TraceLevel::up_to(2).bits(), 0b011);
    assert_eq!(TraceLevel::up_to(3), TraceLevel::ALL);
    assert_eq!(TraceLevel::up_to(9), TraceLevel::ALL);
    assert!(TraceLevel::ALL.contains(TraceLevel::TIER3));
    assert!(!TraceLevel::up_to(2).contains(TraceLevel::TIER3));
}

#[test]
fn opcode_tiers() {
    let tier = |tier: TraceLevel| {
        (1..=13)
            .filter_map(TraceOpcode::from_u8)
            .filter(|op| op.level() == tier)
            .count()
    };
    assert_eq!(tier(TraceLevel::TIER1), 7);
    assert_eq!(tier(TraceLevel::TIER2), 3);
    assert_eq!(tier(TraceLevel::TIER3), 3);
    assert_eq!(TraceOpcode::from_u8(0), None);
    assert_eq!(TraceOpcode::from_u8(14), None);
}

#[test]
fn records_are_stamped_with_tick() {
    let mut buffer = TraceBuffer::new(4, TraceLevel::TIER1);
    buffer.set_tick(7);
    buffer.trace_enter(0, 1);
    buffer.set_tick(0x1_0003);
    buffer.trace_enter(0, 2);

    let ticks: Vec<_> = buffer.records().map(|r| r.tick).collect();
    assert_eq!(ticks, [7, 3]);
}

#[test]
fn record_byte_layout() {
    let mut buffer = TraceBuffer::new(1, TraceLevel::ALL);
    buffer.set_tick(0x0102);
    buffer.trace_conflict(0x0a0b_0c0d, 0b0110, 5, 7);

    let raw = *buffer.raw().next().unwrap();
    assert_eq!(raw.len(), RECORD_SIZE);
    assert_eq!(
        raw,
        [13, 0b0110, 0x02, 0x01, 0x0d, 0x0c, 0x0b, 0x0a, 5, 0, 7, 0, 0, 0, 0, 0]
    );

    let record = TraceRecord::from_bytes(&raw).unwrap();
    assert_eq!(record.opcode, TraceOpcode::Conflict);
    assert_eq!(record.aux, 0b0110);
    assert_eq!(record.instance, 0x0a0b_0c0d);
    assert_eq!(record.args, [5, 7, 0, 0]);
}

#[test]
fn unknown_opcode_does_not_decode() {
    let mut raw = TraceRecord::new(TraceOpcode::Enter, 0).to_bytes();
    raw[0] = 0xff;
    assert_eq!(TraceRecord::from_bytes(&raw), None);
}

#[test]
fn event_record_keeps_priority() {
    let mut buffer = TraceBuffer::new(2, TraceLevel::TIER1);
    buffer.trace_event(3, &HsmEvent::new(42).with_priority(EventPriority::Interrupt));

    let record = buffer.records().next().unwrap();
    assert_eq!(record.instance, 3);
    assert_eq!(record.args, [42, 2, 0, 0]);
}
