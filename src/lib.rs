//! # Bank Server
//!
//! A small TCP service that keeps an in-memory ledger of account balances and
//! answers one pseudo-HTTP request per connection.
//!
//! ## Design Principles
//!
//! - **Decimal money**: balances use `rust_decimal`, displayed with 2 places
//! - **Typed requests**: request lines parse into a `Request` or a `RequestError`
//! - **Serialized ledger**: one lock, held only while a request is dispatched
//! - **Observed workers**: one thread per connection; handles are joined, not detached
//!
//! ## Example
//!
//! ```
//! use bank_server::{handle_connection, SharedLedger};
//! use std::io::Cursor;
//!
//! let ledger = SharedLedger::new();
//! let mut output = Vec::new();
//! handle_connection(
//!     Cursor::new("GET /bin/create&acct=bob HTTP/1.1\r\n\r\n"),
//!     &mut output,
//!     &ledger,
//! )
//! .unwrap();
//! assert!(String::from_utf8(output).unwrap().ends_with("Account bob created"));
//! ```

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod money;
pub mod request;
pub mod server;

pub use cli::{Cli, Mode};
pub use dispatch::{dispatch, Response, StatusCode};
pub use error::{RequestError, Result, ServerError};
pub use handler::{handle_connection, replay_file, MAX_LINE_LEN};
pub use ledger::{Ledger, Outcome, SharedLedger};
pub use money::{Money, ParseMoneyError};
pub use request::{Command, Request};
pub use server::Server;
