//! Request-scoped error kinds.
//!
//! Every failure here is scoped to a single connection; none of them may
//! terminate the accept loop.

use std::io;

use thiserror::Error;

/// Failure while reading or parsing a request, or writing its response.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Client sent something we refuse to route: bad request head, or a POST
    /// with a missing/invalid `Content-Length`. Answered with 400.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// Client went away mid-read or mid-write. Logged and abandoned;
    /// recoverable at the server level.
    #[error("client disconnected")]
    Disconnect(#[source] io::Error),

    /// Any other I/O failure on the connection.
    #[error(transparent)]
    Io(io::Error),
}

impl RequestError {
    /// Whether the client closing the connection explains this error.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, RequestError::Disconnect(_))
    }
}

impl From<io::Error> for RequestError {
    fn from(err: io::Error) -> Self {
        if is_disconnect_kind(&err) {
            RequestError::Disconnect(err)
        } else {
            RequestError::Io(err)
        }
    }
}

/// Classify the `io::ErrorKind`s a closing client produces.
#[must_use]
pub fn is_disconnect_kind(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_kinds_are_classified() {
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        assert!(RequestError::from(err).is_disconnect());
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "gone");
        assert!(RequestError::from(err).is_disconnect());
    }

    #[test]
    fn other_io_errors_are_not_disconnects() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(!RequestError::from(err).is_disconnect());
        assert!(!RequestError::Malformed("x".into()).is_disconnect());
    }
}
