use std::{error, fmt};

use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// The error returned by every fallible operation in this crate.
///
/// Whatever went wrong, whether the provider could not be reached, replied with something
/// unexpected, or the handler was used out of order, surfaces as this one type. Use
/// [`kind`](Self::kind) to find out which.
#[derive(Debug)]
pub struct Error {
    repr: Box<ErrorRepr>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.repr.kind
    }

    /// The URL of the endpoint being called when the error occurred, if there was one.
    pub fn endpoint(&self) -> Option<&str> {
        self.repr.endpoint.as_deref()
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self.kind(), ErrorKind::Protocol(_))
    }

    pub(crate) fn into_kind(self) -> ErrorKind {
        self.repr.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.endpoint() {
            Some(endpoint) => {
                write!(f, "authentication flow failed at {}: {}", endpoint, self.kind())
            }
            None => write!(f, "authentication flow failed: {}", self.kind()),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(self.kind())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        ErrorRepr {
            kind,
            endpoint: None,
        }
        .boxed()
    }
}

#[derive(Debug)]
pub(crate) struct ErrorRepr {
    pub kind: ErrorKind,
    pub endpoint: Option<Box<str>>,
}

impl ErrorRepr {
    pub(crate) fn at(endpoint: &str, kind: ErrorKind) -> Self {
        Self {
            kind,
            endpoint: Some(endpoint.into()),
        }
    }

    pub(crate) fn boxed(self) -> Error {
        Error { repr: Box::new(self) }
    }
}

#[derive(ThisError, Debug)]
pub enum ErrorKind {
    /// The request could not be completed: connection, TLS, timeout and so on.
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    /// The provider answered, but not with what the protocol requires.
    #[error(transparent)]
    Protocol(ProtocolViolation),
    /// An operation which requires an access token was called before one was set.
    #[error("no access token set")]
    NoAccessToken,
    /// The credentials did not resolve to a user identity.
    #[error("unable to resolve identity{}", fmt_status(.status))]
    IdentityUnresolved { status: Option<StatusCode> },
    /// A decorator produced a string which is not a valid HTTP header value.
    #[error("authorization header is not a valid header value")]
    BadAuthHeader,
}

#[derive(ThisError, Debug)]
pub enum ProtocolViolation {
    #[error("provider responded with {status}: {body}")]
    ErrorStatus { status: StatusCode, body: Box<str> },
    #[error("no {0} in response")]
    MissingField(&'static str),
    #[error("expected token_type to equal \"bearer\", but got {0:?}")]
    UnexpectedTokenType(Option<Box<str>>),
    #[error("invalid JSON response: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

fn fmt_status(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!(" (provider responded with {})", status),
        None => String::new(),
    }
}
