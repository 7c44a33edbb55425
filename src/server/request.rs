use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;

use http::Method;
use serde::Serialize;
use tracing::debug;

use crate::error::RequestError;

/// Upper bound on the request head (request line + headers).
const MAX_HEAD_BYTES: usize = 16 * 1024;
/// Upper bound on a request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;
/// Maximum number of request headers.
const MAX_HEADERS: usize = 32;

/// One parsed HTTP request, scoped to a single connection.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, ...).
    pub method: Method,
    /// Request path with any query string removed.
    pub path: String,
    /// Headers with lowercased names.
    pub headers: HashMap<String, String>,
    /// Raw body bytes; empty when the request carried none.
    pub body: Vec<u8>,
}

impl ParsedRequest {
    /// Look up a header by its lowercase name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Decode the body as a form-encoded field list and return the value of
    /// the named field, percent-unescaped.
    #[must_use]
    pub fn form_field(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(&self.body)
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Best-effort UTF-8 view of the body.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Request metadata about the connected client, echoed back in JSON
/// responses.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientInfo {
    pub client_ip: String,
    pub client_port: u16,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
}

impl ClientInfo {
    #[must_use]
    pub fn new(peer: SocketAddr, req: &ParsedRequest) -> Self {
        Self {
            client_ip: peer.ip().to_string(),
            client_port: peer.port(),
            user_agent: req.header("user-agent").map(str::to_string),
            content_type: req.header("content-type").map(str::to_string),
        }
    }
}

/// Read and parse one request from the connection.
///
/// The head is parsed incrementally with `httparse`. The body is read to
/// exactly the declared `Content-Length`; a POST without a usable
/// `Content-Length` is malformed. The caller is expected to have armed a
/// read timeout on the stream so a stalled client cannot hold the
/// connection open forever.
pub fn read_request<R: Read>(reader: &mut R) -> Result<ParsedRequest, RequestError> {
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let (head_len, method, path, headers) = loop {
        let mut chunk = [0u8; 1024];
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            return Err(RequestError::Disconnect(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before request head completed",
            )));
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > MAX_HEAD_BYTES {
            return Err(RequestError::Malformed("request head too large".into()));
        }

        let mut header_slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Request::new(&mut header_slots);
        match parsed.parse(&buf) {
            Ok(httparse::Status::Complete(head_len)) => {
                let method = parse_method(parsed.method)?;
                let path = parsed
                    .path
                    .ok_or_else(|| RequestError::Malformed("missing request path".into()))?;
                let path = path.split('?').next().unwrap_or("/").to_string();
                let headers: HashMap<String, String> = parsed
                    .headers
                    .iter()
                    .map(|h| {
                        (
                            h.name.to_ascii_lowercase(),
                            String::from_utf8_lossy(h.value).to_string(),
                        )
                    })
                    .collect();
                break (head_len, method, path, headers);
            }
            Ok(httparse::Status::Partial) => continue,
            Err(e) => return Err(RequestError::Malformed(format!("invalid request head: {e}"))),
        }
    };

    let body_len = declared_body_len(&method, &headers)?;
    if body_len > MAX_BODY_BYTES {
        return Err(RequestError::Malformed("request body too large".into()));
    }

    let mut body = buf[head_len..].to_vec();
    if body.len() > body_len {
        body.truncate(body_len);
    } else if body.len() < body_len {
        let mut rest = vec![0u8; body_len - body.len()];
        reader.read_exact(&mut rest)?;
        body.extend_from_slice(&rest);
    }

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        body_len = body.len(),
        "request parsed"
    );

    Ok(ParsedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn parse_method(method: Option<&str>) -> Result<Method, RequestError> {
    let raw = method.ok_or_else(|| RequestError::Malformed("missing request method".into()))?;
    raw.parse::<Method>()
        .map_err(|_| RequestError::Malformed(format!("invalid method {raw:?}")))
}

/// Body length to read, per the request's `Content-Length`.
///
/// A POST must declare one; for other methods a missing header means no
/// body. An unparseable value is malformed for every method.
fn declared_body_len(
    method: &Method,
    headers: &HashMap<String, String>,
) -> Result<usize, RequestError> {
    match headers.get("content-length") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| RequestError::Malformed(format!("invalid Content-Length {raw:?}"))),
        None if method == Method::POST => Err(RequestError::Malformed(
            "POST requires a Content-Length header".into(),
        )),
        None => Ok(0),
    }
}
