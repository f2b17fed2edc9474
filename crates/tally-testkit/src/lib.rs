//! Tally Testing Infrastructure
//!
//! Deterministic keys, signed transaction builders, starting snapshots and
//! proptest strategies shared by the Tally test suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tally-testkit = { path = "../tally-testkit" }
//! ```

pub mod builders;
pub mod fixtures;
pub mod keys;
pub mod strategies;

pub use builders::{with_corrupted_signature, TxBuilder};
pub use fixtures::genesis;
pub use keys::KeyFixture;
pub use strategies::{arb_round, proptest, RoundSpec};
