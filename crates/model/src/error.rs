use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The connection failed or was interrupted while reading.
    Transport,
    /// The server answered with a non-success status code.
    HttpStatus,
    /// A non-streaming response body could not be decoded.
    Decode,
    /// The request could not be built, e.g. an invalid header value.
    Request,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::HttpStatus => write!(f, "HTTP status error"),
            ErrorKind::Decode => write!(f, "Decode error"),
            ErrorKind::Request => write!(f, "Request error"),
        }
    }
}
