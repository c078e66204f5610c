#![forbid(unsafe_code)]
//! Stdio transport. Clients speak either newline-delimited JSON or MCP
//! header framing; the first meaningful line decides which, and the
//! choice sticks for the rest of the session.

use crate::server::{rpc_failure, JsonRpcRequest, McpServer, INVALID_REQUEST, PARSE_ERROR};
use crate::support::SessionLog;
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};

const FRAME_CAP_BYTES: usize = 16 * 1024 * 1024;
const LENGTH_HEADER: &str = "content-length";

/// How requests and responses are delimited on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Framing {
    /// One JSON value per line.
    Lines,
    /// `Content-Length`-prefixed frames.
    Headers,
}

impl Framing {
    /// Decides the session framing from the first non-blank line. Anything
    /// that is neither JSON nor a header falls back to line mode, where the
    /// client at least gets a parse error back instead of silence.
    fn sniff(first_line: &str) -> Framing {
        if header_value(first_line, LENGTH_HEADER).is_some()
            || header_value(first_line, "content-type").is_some()
        {
            return Framing::Headers;
        }
        Framing::Lines
    }

    fn respond(self, out: &mut impl Write, payload: &Value) -> std::io::Result<()> {
        let body = serde_json::to_vec(payload)?;
        match self {
            Framing::Lines => {
                out.write_all(&body)?;
                out.write_all(b"\n")?;
            }
            Framing::Headers => {
                write!(out, "Content-Length: {}\r\n\r\n", body.len())?;
                out.write_all(&body)?;
            }
        }
        out.flush()
    }
}

/// `Name: value` accessor, case-insensitive on the name.
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (candidate, value) = line.split_once(':')?;
    if candidate.trim().eq_ignore_ascii_case(name) {
        Some(value.trim())
    } else {
        None
    }
}

fn declared_length(line: &str) -> Option<usize> {
    header_value(line, LENGTH_HEADER).and_then(|value| value.parse().ok())
}

fn invalid_frame(message: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, message.to_string())
}

/// Reads one header-framed request body. `first_line` is the header line
/// the caller already consumed; the rest of the header block runs to the
/// first blank line.
fn read_header_frame(
    reader: &mut impl BufRead,
    first_line: &str,
) -> std::io::Result<Option<Vec<u8>>> {
    let mut length = declared_length(first_line);
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            // Client went away mid-header.
            return Ok(None);
        }
        if line.trim_end().is_empty() {
            break;
        }
        length = length.or_else(|| declared_length(&line));
    }

    let length = length.ok_or_else(|| invalid_frame("frame has no Content-Length header"))?;
    if length > FRAME_CAP_BYTES {
        return Err(invalid_frame("frame exceeds the transport size cap"));
    }
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Turns raw request bytes into at most one response value. Serde does the
/// request-shape policing; the id is rescued first so even a malformed
/// request gets answered under its own id.
fn dispatch(server: &mut McpServer, session_log: &mut SessionLog, body: &[u8]) -> Option<Value> {
    let data: Value = match serde_json::from_slice(body) {
        Ok(data) => data,
        Err(err) => {
            session_log.note_error(&format!("parse error: {err}"));
            return Some(rpc_failure(None, PARSE_ERROR, &format!("Parse error: {err}")));
        }
    };
    let id = data.get("id").cloned();
    match serde_json::from_value::<JsonRpcRequest>(data) {
        Ok(request) => {
            session_log.note_method(&request.method);
            server.handle(request)
        }
        Err(err) => Some(rpc_failure(
            id,
            INVALID_REQUEST,
            &format!("Invalid Request: {err}"),
        )),
    }
}

/// Serves requests until stdin closes.
pub(crate) fn run_stdio(
    server: &mut McpServer,
    session_log: &mut SessionLog,
) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();
    let mut framing: Option<Framing> = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let framing = *framing.get_or_insert_with(|| Framing::sniff(&line));

        let body = match framing {
            Framing::Lines => line.trim().as_bytes().to_vec(),
            Framing::Headers => match read_header_frame(&mut reader, &line)? {
                Some(body) => body,
                None => break,
            },
        };
        if let Some(response) = dispatch(server, session_log, &body) {
            framing.respond(&mut stdout, &response)?;
        }
    }

    session_log.note_exit("stdin closed");
    Ok(())
}
