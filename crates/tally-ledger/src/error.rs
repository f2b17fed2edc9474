//! Ledger invariant violations
//!
//! These are engine faults, not verdicts on a transaction. Seeing one means a
//! snapshot was asked to do something the validator should already have
//! ruled out, so callers abort the round instead of skipping the transaction.

use tally_core::OutputId;
use thiserror::Error;

/// Snapshot invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// An identifier would appear twice in one snapshot
    #[error("Output {id} already present in snapshot")]
    DuplicateOutput {
        /// Offending identifier
        id: OutputId,
    },

    /// An identifier was spent that the snapshot does not hold
    #[error("Output {id} not present in snapshot")]
    MissingOutput {
        /// Offending identifier
        id: OutputId,
    },

    /// A negative value would enter the snapshot
    #[error("Output {id} carries negative value {value}")]
    NegativeValue {
        /// Offending identifier
        id: OutputId,
        /// Value found
        value: i64,
    },
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, LedgerError>;
