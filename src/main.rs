//! Bank Server CLI
//!
//! Either listens for clients on a port, or processes a single request read
//! from a file for offline testing.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- 8080
//! cargo run -- request.txt response.txt
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use bank_server::{replay_file, Cli, Mode, Result, Server, SharedLedger};
use clap::Parser;
use log::info;
use std::process;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mode = cli.mode().unwrap_or_else(|e| e.exit());

    if let Err(e) = run(mode) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(mode: Mode) -> Result<()> {
    match mode {
        Mode::Listen(addr) => {
            let server = Server::bind(addr)?;
            server.run()
        }
        Mode::Replay { input, output } => {
            info!("Replaying {} into {}", input.display(), output.display());
            let response = replay_file(&input, &output, &SharedLedger::new())?;
            info!("Replied {} {}", response.status.code(), response.status.reason());
            Ok(())
        }
    }
}
