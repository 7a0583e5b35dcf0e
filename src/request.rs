//! Request line parsing.
//!
//! A request line looks like `GET /bin/credit&acct=bob&amount=10 HTTP/1.1`.
//! Only the path between the first and last space is inspected; the method
//! and version are ignored.

use crate::error::RequestError;
use crate::money::Money;
use std::fmt;
use std::str::FromStr;

const ACCOUNT_MARKER: &str = "&acct=";
const AMOUNT_MARKER: &str = "&amount=";

/// Ledger command encoded in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Remove every account.
    Reset,

    /// Open an account at zero.
    Create,

    /// Add an amount to an account.
    Credit,

    /// Subtract an amount from an account.
    Debit,

    /// Report an account balance.
    Status,
}

impl Command {
    /// Looks up a command by its exact lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reset" => Some(Command::Reset),
            "create" => Some(Command::Create),
            "credit" => Some(Command::Credit),
            "debit" => Some(Command::Debit),
            "status" => Some(Command::Status),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Reset => "reset",
            Command::Create => "create",
            Command::Credit => "credit",
            Command::Debit => "debit",
            Command::Status => "status",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request, ready for dispatch.
///
/// Each variant carries exactly the parameters its command needs, so a credit
/// or debit cannot exist without an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Reset,
    Create { account: String },
    Credit { account: String, amount: Money },
    Debit { account: String, amount: Money },
    Status { account: String },
}

impl Request {
    /// Parses the first line of a client request.
    ///
    /// Trailing `\r\n` is ignored. Every malformed shape maps to a
    /// [`RequestError`]; nothing here can panic on hostile input.
    pub fn parse(line: &str) -> Result<Request, RequestError> {
        let path = extract_path(line)?;

        let head = path.split('&').next().unwrap_or_default();
        let name = head.rsplit('/').next().unwrap_or_default();
        let command = Command::from_name(name)
            .ok_or_else(|| RequestError::UnknownCommand(name.to_string()))?;

        let request = match command {
            Command::Reset => Request::Reset,
            Command::Create => Request::Create {
                account: extract_account(path)?.to_string(),
            },
            Command::Credit => Request::Credit {
                account: extract_account(path)?.to_string(),
                amount: extract_amount(path)?,
            },
            Command::Debit => Request::Debit {
                account: extract_account(path)?.to_string(),
                amount: extract_amount(path)?,
            },
            Command::Status => Request::Status {
                account: extract_account(path)?.to_string(),
            },
        };
        Ok(request)
    }

    pub fn command(&self) -> Command {
        match self {
            Request::Reset => Command::Reset,
            Request::Create { .. } => Command::Create,
            Request::Credit { .. } => Command::Credit,
            Request::Debit { .. } => Command::Debit,
            Request::Status { .. } => Command::Status,
        }
    }

    /// Target account; empty for [`Request::Reset`].
    pub fn account(&self) -> &str {
        match self {
            Request::Reset => "",
            Request::Create { account }
            | Request::Credit { account, .. }
            | Request::Debit { account, .. }
            | Request::Status { account } => account,
        }
    }
}

/// Returns the text between the first and the last space of the line.
fn extract_path(line: &str) -> Result<&str, RequestError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let first = line.find(' ').ok_or(RequestError::MalformedRequestLine)?;
    let last = line.rfind(' ').ok_or(RequestError::MalformedRequestLine)?;
    if last <= first {
        return Err(RequestError::MalformedRequestLine);
    }
    Ok(&line[first + 1..last])
}

/// Account name: after `&acct=` up to `&amount=` or the end of the path.
fn extract_account(path: &str) -> Result<&str, RequestError> {
    let start = path
        .find(ACCOUNT_MARKER)
        .ok_or(RequestError::MissingAccount)?
        + ACCOUNT_MARKER.len();
    let rest = &path[start..];
    let account = match rest.find(AMOUNT_MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    };

    if account.is_empty() {
        return Err(RequestError::EmptyAccount);
    }
    Ok(account)
}

/// Amount: everything after `&amount=`.
fn extract_amount(path: &str) -> Result<Money, RequestError> {
    let start = path
        .find(AMOUNT_MARKER)
        .ok_or(RequestError::MissingAmount)?
        + AMOUNT_MARKER.len();
    let value = &path[start..];

    if value.trim().is_empty() {
        return Err(RequestError::MissingAmount);
    }
    Money::from_str(value).map_err(|source| RequestError::InvalidAmount {
        value: value.to_string(),
        source,
    })
}
