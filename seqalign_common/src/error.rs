use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeqAlignError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Sequences differ in length, or at least one of them is empty
    #[error("Sequence lengths must match (first: {first}, second: {second})")]
    LengthMismatch { first: usize, second: usize },

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

pub type Result<T> = std::result::Result<T, SeqAlignError>;
