use std::io::{self, Write};

use serde_json::Value;
use tracing::{trace, warn};

use crate::chunk::ChunkStream;
use crate::error::is_disconnect_kind;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// One HTTP response: status, headers, body.
///
/// The body is a plain string; the writer decides how it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    /// JSON response with the matching `Content-Type`.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".into()),
        }
    }

    /// HTML response with the matching `Content-Type`.
    #[must_use]
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "text/html; charset=utf-8".into())],
            body,
        }
    }

    /// Bodyless 301 redirect to `location`.
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        Self {
            status: 301,
            headers: vec![("Location".into(), location.into())],
            body: String::new(),
        }
    }

    /// 400 with a JSON error body.
    #[must_use]
    pub fn bad_request(message: &str) -> Self {
        Self::json(
            400,
            &serde_json::json!({ "error": "400 Bad Request", "message": message }),
        )
    }

    /// Look up a header by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }
}

/// Writes one response to a connection.
///
/// The status line and headers go out exactly once, before any body bytes.
/// The body is delivered as a sequence of writes of at most `chunk_size`
/// characters each, in [`ChunkStream`] order; there is no `Content-Length`
/// and no chunked transfer-encoding — `Connection: close` delimits the
/// body. A client disconnect mid-write aborts the remaining chunks without
/// becoming a server failure.
pub struct ResponseWriter<W: Write> {
    writer: W,
    head_sent: bool,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            head_sent: false,
        }
    }

    /// Send a complete response. Consumable once per request.
    pub fn send(&mut self, response: &Response, chunk_size: usize) -> io::Result<()> {
        let result = self
            .write_head(response)
            .and_then(|()| self.stream_body(&response.body, chunk_size));
        match result {
            Err(e) if is_disconnect_kind(&e) => {
                warn!("connection lost while sending response");
                Ok(())
            }
            other => other,
        }
    }

    fn write_head(&mut self, response: &Response) -> io::Result<()> {
        if self.head_sent {
            return Err(io::Error::other("response head already sent"));
        }
        self.head_sent = true;
        write!(
            self.writer,
            "HTTP/1.1 {} {}\r\n",
            response.status,
            status_reason(response.status)
        )?;
        for (name, value) in &response.headers {
            write!(self.writer, "{name}: {value}\r\n")?;
        }
        self.writer.write_all(b"Connection: close\r\n\r\n")
    }

    fn stream_body(&mut self, body: &str, chunk_size: usize) -> io::Result<()> {
        for chunk in ChunkStream::new(body, chunk_size) {
            trace!(chunk_len = chunk.len(), "streaming chunk");
            self.writer.write_all(chunk.as_bytes())?;
        }
        self.writer.flush()
    }
}
