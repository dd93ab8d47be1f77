//! Sample machines compiled through the real pipeline, plus a logging
//! dispatch table.

use hsm_bytecode::{Definition, InstanceView, MachineMetadata};
use hsm_compiler::test_utils::{split_machine, three_state_cycle};
use hsm_compiler::{StateMachineGraph, compile};

use crate::command::CommandWriter;
use crate::dispatch::DispatchTable;

/// User context for tests: a log of invoked actions and a guard switch.
#[derive(Debug, Default)]
pub struct Recorder {
    pub log: Vec<&'static str>,
    pub unlocked: bool,
}

pub fn build(mut graph: StateMachineGraph) -> (Definition, MachineMetadata) {
    compile(&mut graph).unwrap().into_parts()
}

macro_rules! logging_actions {
    ($($name:ident),* $(,)?) => {
        $(
            #[allow(non_snake_case)]
            fn $name(_: &mut InstanceView<'_>, user: &mut Recorder, _: &mut CommandWriter<'_>) {
                user.log.push(stringify!($name));
            }
        )*

        const LOGGED: &[(&str, crate::dispatch::ActionFn<Recorder>)] = &[
            $((stringify!($name), $name)),*
        ];
    };
}

logging_actions!(
    OnEnterIdle, OnExitIdle, OnEnterA, OnExitA, OnEnterB, OnExitB, Watch, Chase, Search,
    DriveLeft, DriveRight, Tick, Pong,
);

fn emit_beep(_: &mut InstanceView<'_>, user: &mut Recorder, commands: &mut CommandWriter<'_>) {
    user.log.push("Beep");
    commands.write(7, b"beep");
}

fn is_unlocked(_: &mut InstanceView<'_>, user: &mut Recorder, _: u16) -> bool {
    user.unlocked
}

fn never(_: &mut InstanceView<'_>, _: &mut Recorder, _: u16) -> bool {
    false
}

/// Every test action and guard, registered by name.
pub fn dispatch() -> DispatchTable<Recorder> {
    let mut table = DispatchTable::new();
    for &(name, action) in LOGGED {
        table.register_action(name, action).unwrap();
    }
    table.register_action("Beep", emit_beep).unwrap();
    table.register_guard("IsUnlocked", is_unlocked).unwrap();
    table.register_guard("Never", never).unwrap();
    table
}

/// Compiler fixtures reused as-is.
pub use hsm_compiler::test_utils::{flat_chain as chain, heater};

/// `Idle --defeat--> A --arrive--> B --timeout--> Idle` with entry/exit
/// actions everywhere and an activity per state.
pub fn patrol() -> StateMachineGraph {
    let mut g = three_state_cycle();
    for (state, activity) in [("Idle", "Watch"), ("A", "Chase"), ("B", "Search")] {
        g.register_action(activity);
        let id = g.lookup(state).unwrap();
        g.state_mut(id).activity(activity);
    }
    g
}

/// [`patrol`] with a timer on every state: same topology, but three timer
/// slots push it out of the 64-byte tier.
pub fn timed_patrol() -> StateMachineGraph {
    let mut g = patrol();
    for state in ["Idle", "A", "B"] {
        let id = g.lookup(state).unwrap();
        g.state_mut(id).timer(5000);
    }
    g
}

/// `Stopped`, parallel `Running { Left { L1, L2 }, Right { R1, R2 } }`.
/// L1 and R1 both claim output lane 0 and have activities. Global `panic`
/// returns to `Stopped`.
///
/// Flat indices: root 0, Stopped 1, Running 2, Left 3, Right 4, L1 5,
/// L2 6, R1 7, R2 8.
pub fn split() -> StateMachineGraph {
    let mut g = split_machine();
    for (state, activity) in [("L1", "DriveLeft"), ("R1", "DriveRight")] {
        g.register_action(activity);
        let id = g.lookup(state).unwrap();
        g.state_mut(id).activity(activity).output_lanes(0b01);
    }
    g
}

/// Names of the active leaves, in slot order.
pub fn leaves(view: &InstanceView<'_>, meta: &MachineMetadata) -> Vec<String> {
    view.active_leaves()
        .map(|s| meta.state_name(s).unwrap_or("?").to_string())
        .collect()
}
