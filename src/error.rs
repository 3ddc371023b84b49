//! Error types for wikiclient
//!
//! This module provides the failure taxonomy for the library:
//! - Categorized action failures carrying the action name and the server's
//!   literal error code (edit, login, move, generic)
//! - Transport failures annotated with the action that was in flight
//! - Codec errors for the binary session/namespace cache format

use crate::types::Action;
use thiserror::Error;

/// Result type alias for wikiclient operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wikiclient
///
/// Server-reported errors are categorized by the action that produced them.
/// Each such variant carries the literal error code the server returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Login failed (bad credentials, throttled account, token handshake failure)
    #[error("login failed with server error '{code}'")]
    Login {
        /// The literal error code or result string the server returned
        code: String,
    },

    /// Edit failed (protected page, edit conflict, spam filter, bad token)
    #[error("edit failed with server error '{code}'")]
    Edit {
        /// The literal error code or result string the server returned
        code: String,
    },

    /// Page move failed
    #[error("move failed with server error '{code}'")]
    Move {
        /// The literal error code or result string the server returned
        code: String,
    },

    /// Any other server-reported action failure
    #[error("{action} failed with server error '{code}'")]
    Action {
        /// The action that was being performed
        action: Action,
        /// The literal error code the server returned
        code: String,
    },

    /// Raw page content fetch returned HTTP 404
    #[error("page not found: {0}")]
    PageNotFound(String),

    /// Transport failure (connectivity, TLS, timeout), never retried by this layer
    #[error("{action} request failed: {source}")]
    Network {
        /// The action that was being performed when the transport failed
        action: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Server response could not be parsed as XML
    #[error("malformed response: {0}")]
    Xml(String),

    /// Invalid request parameter
    #[error("invalid parameter: {message}")]
    Param {
        /// Human-readable description of the violation
        message: String,
        /// The parameter key that caused the error, if any
        key: Option<String>,
    },

    /// Invalid argument to a library call (empty title, missing token, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Binary cache codec error
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O error (cache file persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the tagged binary codec used for cookie/namespace cache blobs
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Stream ended before the value was complete
    #[error("unexpected end of stream")]
    UnexpectedEnd,

    /// The next tag did not match the requested value type
    #[error("invalid format: expected {expected}, found tag {found}")]
    WrongTag {
        /// The value type the caller asked for
        expected: &'static str,
        /// The tag byte actually present in the stream
        found: u8,
    },
}

impl Error {
    /// Map a server-reported error code to the categorized failure for `action`.
    ///
    /// Edit-class, login-class and move-class errors get their own variants;
    /// everything else falls through to [`Error::Action`].
    pub(crate) fn for_action(action: Action, code: impl Into<String>) -> Self {
        let code = code.into();
        match action {
            Action::Edit => Error::Edit { code },
            Action::Login => Error::Login { code },
            Action::Move => Error::Move { code },
            _ => Error::Action { action, code },
        }
    }

    /// Annotate a transport failure with the action that was in flight
    pub(crate) fn network(action: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Network {
            action: action.into(),
            source,
        }
    }
}
