//! CLI entrypoint for the `pfserver` file server.
//!
//! The binary delegates to [`pfserver_cli::run`], which parses arguments,
//! loads the JSON configuration, and drives the start, stop, and status flows.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Unlocked handles: a started server keeps running inside this call and
    // its worker threads log through stderr.
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    pfserver_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
