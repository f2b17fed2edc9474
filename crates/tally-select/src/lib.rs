//! # Tally Select - Max-Fee Admission
//!
//! Chooses which candidate transactions a round admits.
//!
//! ## Architecture
//!
//! - **selector**: [`MaxFeeSelector`], exhaustive fee-maximizing selection
//!   (plus the greedy baseline), committing the chosen chain
//! - **search**: memoized search over one conflict component
//! - **candidates**: deduplication, component partitioning, bitsets
//! - **handler**: [`TxHandler`], the round driver holding the live snapshot
//! - **config**: [`SelectorConfig`] from TOML and `TALLY_*` variables
//!
//! ```rust,ignore
//! use tally_select::{MaxFeeSelector, SelectorConfig};
//!
//! let selector = MaxFeeSelector::new(SelectorConfig::default());
//! let outcome = selector.select_and_apply(&candidates, &pool)?;
//! println!("collected {} in fees", outcome.total_fee);
//! ```

mod candidates;
pub mod config;
mod error;
pub mod handler;
mod search;
pub mod selector;

pub use config::{ConfigError, SelectionStrategy, SelectorConfig};
pub use error::{Result, SelectError};
pub use handler::TxHandler;
pub use selector::{MaxFeeSelector, RoundOutcome, SearchStats};
