//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, value_parser};

/// Definition blob to inspect (positional).
pub fn blob_arg() -> Arg {
    Arg::new("blob")
        .value_name("BLOB")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Compiled definition blob")
}

/// Currently loaded blob (first positional of `diff`).
pub fn old_arg() -> Arg {
    Arg::new("old")
        .value_name("OLD")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Blob currently running")
}

/// Replacement blob (second positional of `diff`).
pub fn new_arg() -> Arg {
    Arg::new("new")
        .value_name("NEW")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Blob about to be loaded")
}

/// Metadata sidecar (--meta).
pub fn meta_arg() -> Arg {
    Arg::new("meta")
        .long("meta")
        .short('m')
        .value_name("JSON")
        .value_parser(value_parser!(PathBuf))
        .help("Metadata JSON with state, event, action and guard names")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}
