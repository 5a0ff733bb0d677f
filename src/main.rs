//! sshd-algo-check - compare the algorithms an sshd offers against an allow-list
//!
//! Runs the system SSH client in verbose mode, reads the server's KEXINIT
//! proposal out of the trace and reports which offered key-exchange,
//! host-key, cipher and MAC algorithms are on the compliance allow-list.

mod cli;
mod core;
mod host;
mod logging;
mod probe;
mod settings;

use clap::Parser;
use cli::check::CheckError;
use cli::{exit_codes, Cli};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    match rt.block_on(cli::check::run(&cli)) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => report_error(&e),
    }
}

/// Print an error and pick the exit code for it
///
/// Diagnostic stops are printed like a normal result and still exit 0.
fn report_error(e: &CheckError) -> i32 {
    if e.is_diagnostic() {
        println!("{}", e);
        exit_codes::SUCCESS
    } else {
        tracing::debug!("Check failed: {:?}", e);
        eprintln!("Error: {}", e);
        exit_codes::UNEXPECTED_FAILURE
    }
}
