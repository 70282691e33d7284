use std::fmt;

/// Represents errors that can occur in the counter store.
#[derive(Debug)]
pub enum Error {
    /// Key is not exactly the configured width.
    InvalidKeyLength { expected: usize, actual: usize },

    /// The probe walk exhausted its depth limit without resolving the key.
    NotFound,

    /// The probe walk exhausted its depth limit without finding a reusable
    /// slot; the chain is effectively full.
    WriteFailed,

    /// An empty counter vector was passed to the encoder.
    EmptyInput,

    /// The encoded counter vector does not fit the slot's value region.
    EncodingOverflow { encoded_len: usize, capacity: usize },

    /// Stored value bytes are malformed.
    Codec(&'static str),

    /// The backing file could not be created, opened, sized, or mapped.
    StorageInit(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength { expected, actual } => {
                write!(f, "invalid key length: expected {expected} bytes, got {actual}")
            }
            Self::NotFound => write!(f, "key not found within probe depth"),
            Self::WriteFailed => write!(f, "no free slot within probe depth"),
            Self::EmptyInput => write!(f, "cannot encode an empty counter vector"),
            Self::EncodingOverflow { encoded_len, capacity } => {
                write!(f, "encoded vector of {encoded_len} bytes exceeds slot capacity of {capacity}")
            }
            Self::Codec(reason) => write!(f, "malformed value region: {reason}"),
            Self::StorageInit(e) => write!(f, "storage init failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StorageInit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::StorageInit(value)
    }
}

/// Counter store result.
pub type Result<T> = std::result::Result<T, Error>;
