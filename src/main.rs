//! Stackweave CLI entry point
//!
//! Parses arguments, runs the selected command, and renders failures through
//! the user-friendly error formatter before exiting non-zero.

use anyhow::Result;
use clap::Parser;
use stackweave::cli;
use stackweave::core::error::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
