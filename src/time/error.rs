use std::fmt;

/// An error produced while parsing a duration literal such as `250ms` or `30s`.
#[derive(Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    Syntax(String),
    UnitNotSupported(String),
    Overflow(String),
}

impl ::std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Syntax(ref literal) => {
                write!(f, "'{}' is not a duration, expected e.g. '500ms' or '30s'", literal)
            }
            Error::UnitNotSupported(ref unit) => write!(f, "unit '{}' not supported", unit),
            Error::Overflow(ref literal) => write!(f, "duration '{}' is too large", literal),
        }
    }
}

// Shown by `{:?}` in config errors, so keep it readable.
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Syntax(_) => write!(f, "Syntax({})", self),
            Error::UnitNotSupported(_) => write!(f, "UnitNotSupported({})", self),
            Error::Overflow(_) => write!(f, "Overflow({})", self),
        }
    }
}
