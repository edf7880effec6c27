use thiserror::Error as ThisError;

/// Everything that can go wrong while planning or executing a run.
///
/// Only [`Error::Configuration`] ever leaves [`Harness::run`](crate::harness::Harness::run);
/// the other variants are captured per check and end up in the report.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    AssertionMismatch(String),
    #[error("resource error: {0}")]
    Resource(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::Configuration(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::Configuration(err.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Configuration(err.to_string())
    }
}
