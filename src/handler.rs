//! Per-connection request handling.
//!
//! A connection moves through four phases: read the request line, skip the
//! headers, dispatch against the ledger, write the response. The ledger lock
//! is held only while dispatching, never while the client is being read from
//! or written to.

use crate::dispatch::{dispatch, Response};
use crate::error::{RequestError, Result, ServerError};
use crate::ledger::SharedLedger;
use crate::request::Request;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Longest request or header line accepted, excluding the line terminator.
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Handles exactly one request from `reader` and writes one response to `writer`.
///
/// Works the same for sockets and files. Request errors are answered with
/// `400 Bad Request`; only I/O failures and an empty stream are returned as
/// errors, in which case nothing is written. Closing the stream is left to
/// the caller.
pub fn handle_connection<R: BufRead, W: Write>(
    mut reader: R,
    writer: W,
    ledger: &SharedLedger,
) -> Result<Response> {
    let response = match read_request(&mut reader)? {
        Ok(request) => {
            debug!("Parsed request: {:?}", request);
            let outcome = ledger.with(|ledger| dispatch(ledger, &request));
            debug!("{} {}: {}", request.command(), request.account(), outcome);
            Response::from_outcome(&outcome)
        }
        Err(e) => {
            warn!("Rejecting request: {}", e);
            Response::from_error(&e)
        }
    };

    response.write_to(writer)?;
    Ok(response)
}

/// Processes a single request read from `input`, writing the response to `output`.
pub fn replay_file(input: &Path, output: &Path, ledger: &SharedLedger) -> Result<Response> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    handle_connection(reader, writer, ledger)
}

enum Line {
    Complete(Vec<u8>),
    TooLong,
    End,
}

/// Reads the request line and skips the headers.
///
/// The outer error ends the connection without a response; the inner one is
/// answered with `400 Bad Request`.
fn read_request<R: BufRead>(reader: &mut R) -> Result<std::result::Result<Request, RequestError>> {
    let raw = match read_line(reader)? {
        Line::Complete(raw) => raw,
        Line::TooLong => return Ok(Err(too_long())),
        Line::End => return Err(ServerError::ConnectionClosed),
    };
    if let Err(e) = skip_headers(reader)? {
        return Ok(Err(e));
    }

    let line = match String::from_utf8(raw) {
        Ok(line) => line,
        Err(_) => return Ok(Err(RequestError::InvalidEncoding)),
    };
    Ok(Request::parse(&line))
}

/// Reads one line of at most [`MAX_LINE_LEN`] bytes plus its terminator.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Line> {
    // Room for the longest line plus "\r\n"; anything that fills it is too long.
    let limit = MAX_LINE_LEN + 2;
    let mut buf = Vec::new();
    reader
        .by_ref()
        .take(limit as u64)
        .read_until(b'\n', &mut buf)?;

    if buf.is_empty() {
        return Ok(Line::End);
    }
    if buf.len() == limit && !buf.ends_with(b"\r\n") {
        return Ok(Line::TooLong);
    }
    Ok(Line::Complete(buf))
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| *b == b'\r' || *b == b'\n')
}

fn too_long() -> RequestError {
    RequestError::LineTooLong {
        limit: MAX_LINE_LEN,
    }
}

/// Discards header lines up to and including the blank line.
///
/// End of stream also ends the headers. Header bytes are never decoded.
fn skip_headers<R: BufRead>(reader: &mut R) -> Result<std::result::Result<(), RequestError>> {
    let mut skipped = 0;
    loop {
        match read_line(reader)? {
            Line::Complete(line) if is_blank(&line) => break,
            Line::Complete(_) => skipped += 1,
            Line::TooLong => return Ok(Err(too_long())),
            Line::End => {
                debug!("Stream ended before blank line after {} headers", skipped);
                return Ok(Ok(()));
            }
        }
    }
    debug!("Skipped {} headers", skipped);
    Ok(Ok(()))
}
