//! # Tally Core - Ledger Data Model
//!
//! Value types shared by every Tally crate: amounts, content hashes, owner
//! addresses, output identifiers and transactions, together with their
//! canonical byte encodings.
//!
//! ## Architecture
//!
//! - **amount**: fixed-point [`Amount`] and the wide [`Fee`]
//! - **hash**: single home of the content hash algorithm ([`Hash32`])
//! - **address**: owner keys and raw input signatures
//! - **transaction**: [`OutputId`], [`Output`], [`Input`], [`Transaction`]
//! - **crypto**: [`SignatureVerifier`] and [`SignablePayload`] seams with
//!   Ed25519 and canonical defaults
//!
//! Nothing in this crate decides whether a transaction is admissible; that
//! lives in `tally-ledger`.

pub mod address;
pub mod amount;
pub mod crypto;
pub mod errors;
pub mod hash;
pub mod transaction;

pub use address::{Address, Signature};
pub use amount::{wide_sum, Amount, Fee};
pub use crypto::{CanonicalPayload, Ed25519Verifier, SignablePayload, SignatureVerifier};
pub use errors::{CoreError, Result};
pub use hash::{Hash32, TxHash};
pub use transaction::{Input, Output, OutputId, Transaction, TransactionBody};
