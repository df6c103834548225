use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] sensorknn_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}
