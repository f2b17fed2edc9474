//! Selector errors
//!
//! A rejected candidate is never an error here. Everything below either
//! reflects a configured limit or an internal fault that aborts the round.

use tally_ledger::LedgerError;
use thiserror::Error;

/// Failures that abort a round
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Snapshot invariant violated while committing the chosen chain
    #[error("Ledger invariant violated: {0}")]
    Ledger(#[from] LedgerError),

    /// The chosen chain failed re-validation during commit
    #[error("Chosen transaction {tx} no longer validates during commit: {reason}")]
    CommitRejected {
        /// Short hash of the transaction
        tx: String,
        /// Rejection reported by the validator
        reason: String,
    },

    /// Value in the committed snapshot does not match the fees collected
    #[error("Conservation violated: started with {before}, collected {fees}, ended with {after}")]
    Conservation {
        /// Total value before the round
        before: i128,
        /// Total fee collected
        fees: i128,
        /// Total value after the round
        after: i128,
    },

    /// The search visited more states than configured
    #[error("Search budget of {limit} states exhausted")]
    SearchBudgetExceeded {
        /// Configured limit
        limit: usize,
    },
}

/// Result type for selection
pub type Result<T> = std::result::Result<T, SelectError>;
