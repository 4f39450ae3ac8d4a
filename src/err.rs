use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown method: {0}")]
    NotFound(String),

    #[error("{0}")]
    MalformedParameter(String),

    #[error("{name}, {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("method {0} requires a 'user' parameter")]
    MissingUser(String),

    #[error("{method} has no parameter {param}")]
    UnsupportedParameter { method: String, param: String },

    #[error("{0}")]
    HashComputation(String),

    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    #[error("missing label for new uri formatted secret")]
    MissingLabel,

    #[error("EOF, abort!")]
    Eof,

    #[error("Interrupt, abort!")]
    Interrupted,

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn invalid_parameter(name: &str, reason: impl ToString) -> Error {
        Error::InvalidParameter {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub fn hash_computation(e: impl ToString) -> Error {
        Error::HashComputation(e.to_string())
    }
}
