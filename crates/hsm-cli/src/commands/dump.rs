use std::path::PathBuf;

use hsm_bytecode::dump;
use hsm_core::Colors;

use super::load::{LoadError, check_metadata, load_definition, load_metadata};

pub struct DumpArgs {
    pub blob: PathBuf,
    pub meta: Option<PathBuf>,
    pub color: bool,
}

pub fn run(args: DumpArgs) -> Result<(), LoadError> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &DumpArgs) -> Result<String, LoadError> {
    let def = load_definition(&args.blob)?;
    let meta = args.meta.as_deref().map(load_metadata).transpose()?;
    if let Some(meta) = &meta {
        check_metadata(&def, meta)?;
    }
    Ok(dump(&def, meta.as_ref(), Colors::new(args.color)))
}
