//! Command-line interface.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Bank Server - an in-memory account ledger behind a pseudo-HTTP interface
#[derive(Parser, Debug)]
#[command(name = "bank-server")]
#[command(version, about)]
#[command(after_help = "Run `bank-server <PORT>` to listen for clients, or \
                        `bank-server <INPUT> <OUTPUT>` to process one request from a file.")]
pub struct Cli {
    /// Port to listen on, or the request file when OUTPUT is given
    #[arg(value_name = "PORT|INPUT")]
    pub target: String,

    /// File to write the response to (enables replay mode)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Address to bind the listener to
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
}

/// What the process should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Serve clients on this address until the process exits.
    Listen(SocketAddr),

    /// Process one request from `input` and write the response to `output`.
    Replay { input: PathBuf, output: PathBuf },
}

impl Cli {
    /// Resolves the positional arguments into a [`Mode`].
    pub fn mode(&self) -> Result<Mode, clap::Error> {
        match &self.output {
            Some(output) => Ok(Mode::Replay {
                input: PathBuf::from(&self.target),
                output: output.clone(),
            }),
            None => {
                let port: u16 = self.target.parse().map_err(|_| {
                    Cli::command().error(
                        ErrorKind::ValueValidation,
                        format!("invalid port '{}': expected 0-65535", self.target),
                    )
                })?;
                Ok(Mode::Listen(SocketAddr::new(self.bind, port)))
            }
        }
    }
}
