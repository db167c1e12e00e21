use kindledrop_core::logging;

mod cli;

use crate::cli::{exit_code, CliCommand};

fn main() {
    // Log to the XDG state dir when possible, otherwise stderr.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("kindledrop error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}
