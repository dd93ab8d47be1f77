//! Reading blobs and metadata sidecars from disk.

use std::path::{Path, PathBuf};

use hsm_bytecode::{Definition, MachineMetadata, ModuleError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot load `{}`: {source}", path.display())]
    Definition {
        path: PathBuf,
        #[source]
        source: ModuleError,
    },
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid metadata `{}`: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("metadata names {names} states, definition has {states}")]
    MetadataMismatch { names: usize, states: usize },
}

pub fn load_definition(path: &Path) -> Result<Definition, LoadError> {
    Definition::from_path(path).map_err(|source| LoadError::Definition {
        path: path.to_owned(),
        source,
    })
}

pub fn load_metadata(path: &Path) -> Result<MachineMetadata, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    MachineMetadata::from_json(&json).map_err(|source| LoadError::Metadata {
        path: path.to_owned(),
        source,
    })
}

/// Metadata written for a different machine would put wrong names on every
/// line, so its state table must line up with the definition.
pub fn check_metadata(def: &Definition, meta: &MachineMetadata) -> Result<(), LoadError> {
    let states = def.state_count() as usize;
    if meta.states.len() != states {
        return Err(LoadError::MetadataMismatch {
            names: meta.states.len(),
            states,
        });
    }
    Ok(())
}
