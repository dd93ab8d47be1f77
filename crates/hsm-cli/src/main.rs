mod cli;
mod commands;

use cli::{DiffParams, DumpParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into())
        }
        Some(("diff", m)) => {
            let params = DiffParams::from_matches(m);
            commands::diff::run(params.into())
        }
        _ => unreachable!("clap should have caught this"),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
