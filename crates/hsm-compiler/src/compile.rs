//! Pipeline facade: normalize, validate, flatten, emit.

use hsm_bytecode::{Definition, MachineMetadata, Tier};

use crate::diagnostics::Diagnostics;
use crate::emit::emit;
use crate::flatten::{Flattened, flatten};
use crate::graph::StateMachineGraph;
use crate::normalize::normalize;
use crate::validate::validate;
use crate::{Error, Result};

/// A compiled machine: the loaded blob plus its name table.
#[derive(Debug)]
pub struct CompiledMachine {
    definition: Definition,
    metadata: MachineMetadata,
    warnings: Diagnostics,
}

impl CompiledMachine {
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn into_parts(self) -> (Definition, MachineMetadata) {
        (self.definition, self.metadata)
    }

    pub fn bytes(&self) -> &[u8] {
        self.definition.bytes()
    }

    pub fn tier(&self) -> Tier {
        self.definition.tier()
    }

    pub fn metadata(&self) -> &MachineMetadata {
        &self.metadata
    }

    /// Non-blocking findings from validation.
    pub fn warnings(&self) -> &Diagnostics {
        &self.warnings
    }
}

pub fn compile(graph: &mut StateMachineGraph) -> Result<CompiledMachine> {
    normalize(graph);

    let diagnostics = validate(graph);
    if diagnostics.has_errors() {
        return Err(Error::ValidationFailed(diagnostics));
    }

    let flattened = flatten(graph)?;
    let bytes = emit(&flattened.sections);
    let definition = Definition::from_bytes(bytes)?;
    let metadata = metadata(graph, flattened);

    Ok(CompiledMachine {
        definition,
        metadata,
        warnings: diagnostics.warnings(),
    })
}

fn metadata(graph: &StateMachineGraph, flattened: Flattened) -> MachineMetadata {
    MachineMetadata {
        name: graph.name.clone(),
        states: graph
            .flat_order()
            .iter()
            .map(|&id| graph.state(id).name.clone())
            .collect(),
        events: graph
            .events()
            .iter()
            .map(|(name, decl)| (decl.id, name.clone()))
            .collect(),
        actions: flattened.action_names,
        guards: flattened.guard_names,
    }
}
