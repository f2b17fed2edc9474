//! Round driver owning the live snapshot
//!
//! [`TxHandler`] holds the committed [`UtxoPool`] between rounds. Each call to
//! [`TxHandler::handle_txs`] runs one selection over the current pool and,
//! on success, replaces it with the winning snapshot. A failed round leaves
//! the live pool as it was.

use tally_core::{
    CanonicalPayload, Ed25519Verifier, Fee, SignablePayload, SignatureVerifier, Transaction,
};
use tally_ledger::{Rejection, UtxoPool};
use tracing::debug;

use crate::config::SelectorConfig;
use crate::error::Result;
use crate::selector::{MaxFeeSelector, RoundOutcome};

/// Sequential round driver
#[derive(Debug, Clone)]
pub struct TxHandler<V = Ed25519Verifier, P = CanonicalPayload> {
    pool: UtxoPool,
    selector: MaxFeeSelector<V, P>,
    rounds: u64,
}

impl TxHandler {
    /// Driver with the default selector, starting from a copy of `pool`
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_selector(pool, MaxFeeSelector::new(SelectorConfig::default()))
    }
}

impl<V: SignatureVerifier, P: SignablePayload> TxHandler<V, P> {
    /// Driver around a configured selector
    pub fn with_selector(pool: &UtxoPool, selector: MaxFeeSelector<V, P>) -> Self {
        Self {
            pool: pool.clone(),
            selector,
            rounds: 0,
        }
    }

    /// Committed snapshot
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    /// Rounds committed so far
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Fee `tx` would pay against the committed snapshot
    pub fn check_tx(&self, tx: &Transaction) -> std::result::Result<Fee, Rejection> {
        self.selector.validator().check(tx, &self.pool)
    }

    /// Whether `tx` is admissible against the committed snapshot
    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        self.selector.validator().is_valid(tx, &self.pool)
    }

    /// Run one round and commit it, returning the accepted chain
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Result<Vec<Transaction>> {
        Ok(self.handle_round(candidates)?.accepted)
    }

    /// Run one round and commit it, returning the full outcome
    ///
    /// The outcome's snapshot is the new committed pool.
    pub fn handle_round(&mut self, candidates: &[Transaction]) -> Result<RoundOutcome> {
        let outcome = self.selector.select_and_apply(candidates, &self.pool)?;
        self.pool = outcome.snapshot.clone();
        self.rounds += 1;
        debug!(round = self.rounds, utxos = self.pool.len(), "round committed");
        Ok(outcome)
    }
}
