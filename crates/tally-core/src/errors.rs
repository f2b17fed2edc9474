//! Error type for decoding and constructing core ledger values

/// Errors raised while parsing or building core types
///
/// None of these describe an invalid transaction. Admission decisions are
/// made by the validator in `tally-ledger` and never surface as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Hex text could not be decoded
    #[error("Invalid hex for {what}: {message}")]
    InvalidHex {
        /// Which value was being decoded
        what: &'static str,
        /// Decoder message
        message: String,
    },

    /// Decoded bytes had the wrong length
    #[error("Invalid length for {what}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Which value was being decoded
        what: &'static str,
        /// Required byte length
        expected: usize,
        /// Byte length found
        actual: usize,
    },

    /// Output positions are addressed with a `u32`
    #[error("Transaction has {count} outputs, more than an output index can address")]
    TooManyOutputs {
        /// Number of outputs supplied
        count: usize,
    },
}

impl CoreError {
    /// Create an invalid hex error
    pub fn invalid_hex(what: &'static str, err: hex::FromHexError) -> Self {
        Self::InvalidHex {
            what,
            message: err.to_string(),
        }
    }

    /// Create an invalid length error
    pub fn invalid_length(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            what,
            expected,
            actual,
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
