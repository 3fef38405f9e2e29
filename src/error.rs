use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// An outcome score outside of `0.0..=1.0`.
    #[error("outcome score must be between 0 and 1 inclusive, got {score}")]
    OutOfRange { score: f64 },
    /// An argument that can not be used to build or rate rating periods.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Error {
        Error::InvalidArgument(message.into())
    }
}
