//! # Tally Ledger - Snapshots and Validation
//!
//! - **pool**: [`UtxoPool`], the per-round snapshot of unspent outputs with
//!   copy-on-branch value semantics and all-or-nothing application
//! - **validator**: [`TxValidator`], the pure admission check producing a fee
//!   or a [`Rejection`]
//!
//! Rejections are ordinary values. [`LedgerError`] is reserved for snapshot
//! invariant violations, which indicate an engine bug.

mod error;
pub mod pool;
pub mod validator;

pub use error::{LedgerError, Result};
pub use pool::{PoolEntry, UtxoPool};
pub use validator::{Rejection, TxValidator};
