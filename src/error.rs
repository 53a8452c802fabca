//! Crate error type.
//!
//! Nothing here is fatal to a running game: callers at the session surface
//! log these and fall back to defaults.

use std::fmt;

/// Errors raised by storage access and JSON (de)serialization
#[derive(Debug)]
pub enum Error {
    /// The key-value store rejected a read or write
    Storage(String),
    /// A stored document or tuning file could not be encoded/decoded
    Json(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Storage(msg) => write!(f, "storage error: {msg}"),
            Error::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Storage(_) => None,
            Error::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
