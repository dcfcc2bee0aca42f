//! Error types.

use std::error;
use std::fmt;
use std::io;

use serde::{de, ser};

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building, training or persisting an
/// autoencoder.
#[derive(Debug)]
pub enum Error {
    /// An operation was called in the wrong training phase, e.g. pre-training
    /// after `pre_training_complete`.
    UsageSequence(&'static str),
    /// An index or size fell outside `[lower, upper)`.
    Bounds {
        what: &'static str,
        value: usize,
        lower: usize,
        upper: usize,
    },
    /// Two lengths that must agree did not.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// Required data was absent.
    NullInput(&'static str),
    /// A configuration was rejected at construction time.
    InvalidArgument(&'static str),
    /// The persisted text could not be parsed or described an inconsistent
    /// model.
    Format(String),
    /// The underlying line sink or source failed.
    Io(io::Error),
}

impl Error {
    pub(crate) fn bounds(what: &'static str, value: usize, upper: usize) -> Self {
        Error::Bounds {
            what,
            value,
            lower: 0,
            upper,
        }
    }
}

/// Fails with `Error::Bounds` unless `lower <= value < upper`.
pub(crate) fn within_bounds(
    what: &'static str,
    value: usize,
    lower: usize,
    upper: usize,
) -> Result<()> {
    if value < lower || value >= upper {
        return Err(Error::Bounds {
            what,
            value,
            lower,
            upper,
        });
    }
    Ok(())
}

/// Fails with `Error::ShapeMismatch` unless `got == expected`.
pub(crate) fn same_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::ShapeMismatch {
            what,
            got,
            expected,
        });
    }
    Ok(())
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UsageSequence(msg) => write!(f, "invalid call sequence: {}", msg),
            Error::Bounds {
                what,
                value,
                lower,
                upper,
            } => write!(
                f,
                "{} {} out of bounds, expected a value in [{}, {})",
                what, value, lower, upper
            ),
            Error::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {}: got {}, expected {}",
                what, got, expected
            ),
            Error::NullInput(msg) => write!(f, "missing input: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::Format(msg) => write!(f, "malformed model text: {}", msg),
            Error::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Format(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Format(msg.to_string())
    }
}
