use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid range [{start}, {end}) in document of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("backend unavailable: {message}")]
    Unavailable { message: String },
}
