//! Maps parsed requests onto ledger operations and renders responses.

use crate::error::RequestError;
use crate::ledger::{Ledger, Outcome};
use crate::request::Request;
use std::io::{self, Write};

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "BankServer";

/// Applies `request` to `ledger` and returns the outcome.
pub fn dispatch(ledger: &mut Ledger, request: &Request) -> Outcome {
    match request {
        Request::Reset => ledger.reset(),
        Request::Create { account } => ledger.create(account),
        Request::Credit { account, amount } => ledger.credit(account, *amount),
        Request::Debit { account, amount } => ledger.debit(account, *amount),
        Request::Status { account } => ledger.status(account),
    }
}

/// Response status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
        }
    }
}

/// A plaintext response sent before the connection is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    /// Domain outcomes, including "not found", are always `200 OK`.
    pub fn from_outcome(outcome: &Outcome) -> Self {
        Response {
            status: StatusCode::Ok,
            body: outcome.to_string(),
        }
    }

    pub fn from_error(err: &RequestError) -> Self {
        Response {
            status: StatusCode::BadRequest,
            body: err.to_string(),
        }
    }

    /// Writes the status line, headers and body.
    ///
    /// `Content-Length` is the byte length of the body.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}\r\n\
             Server: {}\r\n\
             Content-Length: {}\r\n\
             Connection: Close\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             {}",
            self.status.code(),
            self.status.reason(),
            SERVER_NAME,
            self.body.len(),
            self.body
        )?;
        writer.flush()
    }
}
