use std::{io, sync::Arc};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PostingError {
    /// Read or seek beyond the end of a byte stream.
    #[error("Out of range: offset {offset}, total size {total_size}")]
    Range { offset: usize, total_size: usize },
    /// Byte streams only move forward.
    #[error("Backward seek from {current} to {target}")]
    BackwardSeek { current: usize, target: usize },
    /// IO Error while materializing a slice.
    #[error("An IO error occurred: '{0}'")]
    Io(Arc<io::Error>),
    /// Index data violates a structural invariant.
    #[error("Corrupted posting data: '{0}'")]
    Corruption(String),
    /// Invalid argument was passed by the user.
    #[error("An invalid argument was passed: '{0}'")]
    InvalidArgument(String),
    /// A slot handle was used after its slot was freed.
    #[error("Stale slot handle")]
    StaleHandle,
}

impl From<io::Error> for PostingError {
    fn from(io_err: io::Error) -> PostingError {
        PostingError::Io(Arc::new(io_err))
    }
}

pub type Result<T> = std::result::Result<T, PostingError>;
