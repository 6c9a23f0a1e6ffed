//! Error type shared by every operation in the pipeline.

use thiserror::Error;

use crate::codec::{DecodeError, EncodeError};

/// Errors returned by rasterkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A dimension, ratio, radius or budget value is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An in-place mutation was requested on a buffer that is not exclusively held.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Quality descent and the single dimension fallback both failed to fit the budget.
    #[error("Budget of {max_bytes} bytes not achievable (smallest encoding was {smallest} bytes)")]
    BudgetNotAchievable { max_bytes: u64, smallest: usize },

    /// The caller-supplied deadline passed before compression finished.
    #[error("Deadline exceeded after {attempts} encode attempts")]
    DeadlineExceeded { attempts: u32 },

    /// Propagated unchanged from the decoder.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Propagated unchanged from the encoder.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid("radius 30 outside 0..=25");
        assert_eq!(err.to_string(), "Invalid argument: radius 30 outside 0..=25");

        let err = Error::BudgetNotAchievable {
            max_bytes: 100,
            smallest: 250,
        };
        assert_eq!(
            err.to_string(),
            "Budget of 100 bytes not achievable (smallest encoding was 250 bytes)"
        );
    }

    #[test]
    fn test_encode_error_is_transparent() {
        let inner = EncodeError::EncodingFailed("boom".to_string());
        let msg = inner.to_string();
        let err: Error = inner.into();
        assert_eq!(err.to_string(), msg);
        assert!(matches!(err, Error::Encode(_)));
    }
}
