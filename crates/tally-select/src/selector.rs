//! Round selection: choose the accepted chain and commit it
//!
//! [`MaxFeeSelector::select_and_apply`] finds a mutually valid subset of the
//! candidates with the greatest total fee and applies it to a copy of the
//! snapshot. The input snapshot is never modified.
//!
//! The search runs per conflict component. Candidates that share no output
//! identifier cannot influence each other's validity, so the optimum of the
//! whole batch is the sum of the component optima, and each component gets a
//! snapshot restricted to the identifiers its members touch.

use serde::Serialize;
use std::collections::BTreeSet;

use tally_core::{
    CanonicalPayload, Ed25519Verifier, Fee, SignablePayload, SignatureVerifier, Transaction,
};
use tally_ledger::{TxValidator, UtxoPool};
use tracing::{debug, info};

use crate::candidates::{components, dedupe, touched_ids};
use crate::config::{SelectionStrategy, SelectorConfig};
use crate::error::{Result, SelectError};
use crate::search::ComponentSearch;

/// Counters describing one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Candidates proposed
    pub candidates: usize,
    /// Candidates left after dropping repeated hashes
    pub distinct: usize,
    /// Independent conflict components searched
    pub components: usize,
    /// Search states evaluated; validator calls under the greedy strategy
    pub states_explored: usize,
    /// Validator rejections seen while searching
    pub rejections: usize,
}

/// Result of one round
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Accepted transactions in an order valid for sequential application
    pub accepted: Vec<Transaction>,
    /// Sum of the accepted transactions' fees
    pub total_fee: Fee,
    /// Snapshot after applying `accepted`
    pub snapshot: UtxoPool,
    /// Search counters
    pub stats: SearchStats,
}

/// Fee-maximizing transaction selector
#[derive(Debug, Clone, Default)]
pub struct MaxFeeSelector<V = Ed25519Verifier, P = CanonicalPayload> {
    validator: TxValidator<V, P>,
    config: SelectorConfig,
}

impl MaxFeeSelector {
    /// Selector with default Ed25519 validation
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            validator: TxValidator::new(),
            config,
        }
    }
}

impl<V: SignatureVerifier, P: SignablePayload> MaxFeeSelector<V, P> {
    /// Selector around a caller-built validator
    pub fn with_validator(validator: TxValidator<V, P>, config: SelectorConfig) -> Self {
        Self { validator, config }
    }

    /// Validator used for every admission check
    pub fn validator(&self) -> &TxValidator<V, P> {
        &self.validator
    }

    /// Active configuration
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Choose the accepted chain for `candidates` and apply it to a copy of `pool`
    pub fn select_and_apply(
        &self,
        candidates: &[Transaction],
        pool: &UtxoPool,
    ) -> Result<RoundOutcome> {
        let distinct = dedupe(candidates);
        let mut stats = SearchStats {
            candidates: candidates.len(),
            distinct: distinct.len(),
            ..SearchStats::default()
        };

        let chain = match self.config.strategy {
            SelectionStrategy::MaxFee => self.search(&distinct, pool, &mut stats)?,
            SelectionStrategy::Greedy => self.greedy(&distinct, pool, &mut stats)?,
        };

        let (snapshot, total_fee) = self.commit(&chain, pool)?;
        let accepted: Vec<Transaction> = chain.into_iter().cloned().collect();
        info!(
            strategy = %self.config.strategy,
            candidates = stats.candidates,
            accepted = accepted.len(),
            %total_fee,
            states = stats.states_explored,
            "round selected"
        );
        Ok(RoundOutcome {
            accepted,
            total_fee,
            snapshot,
            stats,
        })
    }

    fn search<'a>(
        &self,
        distinct: &[&'a Transaction],
        pool: &UtxoPool,
        stats: &mut SearchStats,
    ) -> Result<Vec<&'a Transaction>> {
        let groups = components(distinct);
        stats.components = groups.len();

        let mut chain = Vec::new();
        for group in groups {
            let members: Vec<&'a Transaction> = group.iter().map(|&i| distinct[i]).collect();
            let touched: BTreeSet<_> = members.iter().flat_map(|tx| touched_ids(*tx)).collect();
            let local = pool.restricted_to(&touched);

            let remaining = self
                .config
                .max_search_states
                .map(|limit| limit.saturating_sub(stats.states_explored));
            let result = ComponentSearch::new(members, &self.validator, remaining)
                .run(&local)
                .map_err(|e| self.with_configured_limit(e))?;

            debug!(
                members = group.len(),
                chosen = result.chain.len(),
                fee = %result.fee,
                states = result.states,
                "component searched"
            );
            stats.states_explored += result.states;
            stats.rejections += result.rejections;
            chain.extend(result.chain);
        }
        Ok(chain)
    }

    fn greedy<'a>(
        &self,
        distinct: &[&'a Transaction],
        pool: &UtxoPool,
        stats: &mut SearchStats,
    ) -> Result<Vec<&'a Transaction>> {
        let mut running = pool.clone();
        let mut taken = vec![false; distinct.len()];
        let mut chain = Vec::new();
        loop {
            let mut progressed = false;
            for (i, tx) in distinct.iter().enumerate() {
                if taken[i] {
                    continue;
                }
                stats.states_explored += 1;
                if self.validator.check(tx, &running).is_ok() {
                    running.apply(tx)?;
                    taken[i] = true;
                    chain.push(*tx);
                    progressed = true;
                } else {
                    stats.rejections += 1;
                }
            }
            if !progressed {
                break;
            }
        }
        Ok(chain)
    }

    /// Re-validate and apply `chain` in order on a copy of `pool`
    fn commit(&self, chain: &[&Transaction], pool: &UtxoPool) -> Result<(UtxoPool, Fee)> {
        let mut snapshot = pool.clone();
        let mut total_fee = Fee::ZERO;
        for tx in chain {
            let fee = self
                .validator
                .check(tx, &snapshot)
                .map_err(|reason| SelectError::CommitRejected {
                    tx: tx.hash().short(),
                    reason: reason.to_string(),
                })?;
            snapshot.apply(tx)?;
            total_fee += fee;
        }

        audit_conservation(pool.total_value(), total_fee, snapshot.total_value())?;
        Ok((snapshot, total_fee))
    }

    fn with_configured_limit(&self, err: SelectError) -> SelectError {
        match (err, self.config.max_search_states) {
            (SelectError::SearchBudgetExceeded { .. }, Some(limit)) => {
                SelectError::SearchBudgetExceeded { limit }
            }
            (other, _) => other,
        }
    }
}

/// Value before a round must equal value after plus the fees collected
fn audit_conservation(before: i128, fees: Fee, after: i128) -> Result<()> {
    if before - fees.units() != after {
        return Err(SelectError::Conservation {
            before,
            fees: fees.units(),
            after,
        });
    }
    Ok(())
}
