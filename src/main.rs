//! tidytodo - Plain-text todo-list reorganizer

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = tidytodo::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
