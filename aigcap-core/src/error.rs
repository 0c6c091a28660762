//! Error types for the AIGCAP engine.

use std::path::PathBuf;
use std::{error::Error, fmt, io};

/// Error type for AIGCAP core operations.
#[derive(Debug)]
pub enum AigcapError {
    /// An underlying I/O error.
    Io(io::Error),
    /// The scan root does not exist or is not a directory.
    InvalidRoot(PathBuf),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for AigcapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::InvalidRoot(path) => write!(f, "'{}' is not a directory", path.display()),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for AigcapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AigcapError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for AIGCAP core.
pub type Result<T> = std::result::Result<T, AigcapError>;
