//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("hsm")
        .about("Inspect fasthsm definition blobs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(dump_command())
        .subcommand(diff_command())
}

/// Print every section of a definition blob.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the contents of a definition blob")
        .after_help(
            r#"EXAMPLES:
  hsm dump door.fhsm                        # raw ids
  hsm dump door.fhsm --meta door.json       # with names
  hsm dump door.fhsm --color never | less"#,
        )
        .arg(blob_arg())
        .arg(meta_arg())
        .arg(color_arg())
}

/// Classify what loading NEW over OLD does to running instances.
pub fn diff_command() -> Command {
    Command::new("diff")
        .about("Classify a reload from one blob to another")
        .after_help(
            r#"EXAMPLES:
  hsm diff door-v1.fhsm door-v2.fhsm"#,
        )
        .arg(old_arg())
        .arg(new_arg())
        .arg(color_arg())
}
