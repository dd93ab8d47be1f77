use hsm_bytecode::{Definition, HsmEvent, InstanceView};

/// Event `id` carrying the priority and flags declared for it.
///
/// Ids missing from the definition's event table get Normal priority and no
/// flags.
pub fn event_for(definition: &Definition, id: u16) -> HsmEvent {
    match definition.event_def(id) {
        Some(decl) => HsmEvent::new(id)
            .with_priority(decl.priority)
            .with_flags(decl.flags),
        None => HsmEvent::new(id),
    }
}

/// Queue event `id` on `view` with its declared defaults. False when the
/// queue dropped it.
pub fn post_event(definition: &Definition, view: &mut InstanceView<'_>, id: u16) -> bool {
    let event = event_for(definition, id);
    let priority = event.priority;
    view.enqueue(event, priority)
}
