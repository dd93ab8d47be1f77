//! Extract params from `ArgMatches` and convert them to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::diff::DiffArgs;
use crate::commands::dump::DumpArgs;

pub struct DumpParams {
    pub blob: PathBuf,
    pub meta: Option<PathBuf>,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            blob: required_path(m, "blob"),
            meta: m.get_one::<PathBuf>("meta").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            blob: p.blob,
            meta: p.meta,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DiffParams {
    pub old: PathBuf,
    pub new: PathBuf,
    pub color: ColorChoice,
}

impl DiffParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            old: required_path(m, "old"),
            new: required_path(m, "new"),
            color: parse_color(m),
        }
    }
}

impl From<DiffParams> for DiffArgs {
    fn from(p: DiffParams) -> Self {
        Self {
            old: p.old,
            new: p.new,
            color: p.color.should_colorize(),
        }
    }
}

fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| unreachable!("clap requires `{id}`"))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
