use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown regime: {0}")]
    UnknownRegime(String),

    #[error("invalid bands for regime {regime}: {reason}")]
    InvalidBands { regime: &'static str, reason: String },

    #[error("malformed shared state: {0}")]
    MalformedPersistedState(String),
}

pub type Result<T> = std::result::Result<T, Error>;
