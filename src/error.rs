//! Error types for the bank server.

use crate::money::ParseMoneyError;
use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// A request line that cannot be turned into a ledger command.
///
/// These are answered with `400 Bad Request` and never touch the ledger.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Request line is not valid UTF-8
    #[error("Request line is not valid UTF-8")]
    InvalidEncoding,

    /// A request or header line exceeds the line length limit
    #[error("Request line too long (limit {limit} bytes)")]
    LineTooLong { limit: usize },

    /// Request line lacks the `METHOD PATH VERSION` shape
    #[error("Malformed request line")]
    MalformedRequestLine,

    /// Command segment is not one of the five known commands
    #[error("Unrecognized command: {0}")]
    UnknownCommand(String),

    /// No `&acct=` marker in the path
    #[error("Missing account parameter")]
    MissingAccount,

    /// `&acct=` present but empty
    #[error("Account name must not be empty")]
    EmptyAccount,

    /// Credit or debit without an amount
    #[error("Missing amount parameter")]
    MissingAmount,

    /// Amount is not a decimal number
    #[error("Invalid amount '{value}': {source}")]
    InvalidAmount {
        value: String,
        #[source]
        source: ParseMoneyError,
    },
}

/// Errors that end a connection or stop the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Reading from or writing to a stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Client closed the stream before sending a request line
    #[error("Connection closed before a request line was received")]
    ConnectionClosed,

    /// A connection worker panicked
    #[error("Connection worker panicked")]
    WorkerPanicked,
}
