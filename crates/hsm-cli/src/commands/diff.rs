use std::fmt::Write as _;
use std::path::PathBuf;

use hsm_bytecode::Definition;
use hsm_core::Colors;
use hsm_vm::ReloadOutcome;

use super::load::{LoadError, load_definition};

pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    pub color: bool,
}

pub fn run(args: DiffArgs) -> Result<(), LoadError> {
    print!("{}", render(&args)?);
    Ok(())
}

pub fn render(args: &DiffArgs) -> Result<String, LoadError> {
    let old = load_definition(&args.old)?;
    let new = load_definition(&args.new)?;
    let outcome = ReloadOutcome::classify(Some(&old), &new);
    Ok(describe(&old, &new, outcome, Colors::new(args.color)))
}

pub fn describe(old: &Definition, new: &Definition, outcome: ReloadOutcome, c: Colors) -> String {
    let mut out = String::new();
    let hashes = [
        ("structure", old.structure_hash(), new.structure_hash()),
        ("parameter", old.parameter_hash(), new.parameter_hash()),
    ];
    for (label, before, after) in hashes {
        let color = if before == after { c.dim } else { c.yellow };
        writeln!(
            out,
            "{label:<9} = {:#010x} -> {}{:#010x}{}",
            before, color, after, c.reset
        )
        .expect("String write never fails");
    }

    let verdict = match outcome {
        ReloadOutcome::NewMachine => c.paint(c.green, "new machine"),
        ReloadOutcome::NoChange => c.paint(c.green, "no change"),
        ReloadOutcome::SoftReload => {
            c.paint(c.yellow, "soft reload: running instances keep their state")
        }
        ReloadOutcome::HardReset { old, new } => c.paint(
            c.red,
            format!("hard reset: instances of {old:#010x} restart as {new:#010x}"),
        ),
    };
    writeln!(out, "{verdict}").expect("String write never fails");
    out
}
