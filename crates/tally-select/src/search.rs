//! Memoized exhaustive search over one conflict component
//!
//! A state is the set of component members applied so far. The snapshot at a
//! state is fully determined by that set (spent ids removed, minted ids
//! added), so the best continuation from a state only has to be computed
//! once no matter how many inclusion orders reach it. From every state each
//! unapplied member that validates is tried, and the continuation with the
//! strictly greatest total fee wins; ties keep the lowest member position.
//!
//! Each step receives its own snapshot via `UtxoPool::with_applied`, so
//! sibling branches never observe each other's speculative changes.

use std::collections::HashMap;

use tally_core::{Fee, SignablePayload, SignatureVerifier, Transaction};
use tally_ledger::{TxValidator, UtxoPool};
use tracing::trace;

use crate::candidates::TxSet;
use crate::error::{Result, SelectError};

#[derive(Debug, Clone, Copy)]
struct Best {
    fee: Fee,
    next: Option<usize>,
}

/// Search over the members of one component
pub(crate) struct ComponentSearch<'t, 'v, V, P> {
    members: Vec<&'t Transaction>,
    validator: &'v TxValidator<V, P>,
    memo: HashMap<TxSet, Best>,
    budget: Option<usize>,
    rejections: usize,
}

/// Result of searching one component
#[derive(Debug)]
pub(crate) struct ComponentResult<'t> {
    /// Chosen members in application order
    pub chain: Vec<&'t Transaction>,
    /// Total fee of the chain
    pub fee: Fee,
    /// Distinct states evaluated
    pub states: usize,
    /// Validator rejections seen while searching
    pub rejections: usize,
}

impl<'t, 'v, V: SignatureVerifier, P: SignablePayload> ComponentSearch<'t, 'v, V, P> {
    /// Prepare a search allowed to evaluate at most `budget` states
    pub(crate) fn new(
        members: Vec<&'t Transaction>,
        validator: &'v TxValidator<V, P>,
        budget: Option<usize>,
    ) -> Self {
        Self {
            members,
            validator,
            memo: HashMap::new(),
            budget,
            rejections: 0,
        }
    }

    /// Run from `pool`, which must hold every entry the members touch
    pub(crate) fn run(mut self, pool: &UtxoPool) -> Result<ComponentResult<'t>> {
        let start = TxSet::empty(self.members.len());
        let fee = self.best_from(&start, pool)?;

        let mut chain = Vec::new();
        let mut state = start;
        while let Some(next) = self.memo.get(&state).and_then(|best| best.next) {
            chain.push(self.members[next]);
            state = state.with(next);
        }

        Ok(ComponentResult {
            chain,
            fee,
            states: self.memo.len(),
            rejections: self.rejections,
        })
    }

    fn best_from(&mut self, applied: &TxSet, pool: &UtxoPool) -> Result<Fee> {
        if let Some(best) = self.memo.get(applied) {
            return Ok(best.fee);
        }
        if let Some(limit) = self.budget {
            if self.memo.len() >= limit {
                return Err(SelectError::SearchBudgetExceeded { limit });
            }
        }

        let mut best = Best {
            fee: Fee::ZERO,
            next: None,
        };
        for i in 0..self.members.len() {
            if applied.contains(i) {
                continue;
            }
            let tx = self.members[i];
            let fee = match self.validator.check(tx, pool) {
                Ok(fee) => fee,
                Err(_) => {
                    self.rejections += 1;
                    continue;
                }
            };
            let branch = pool.with_applied(tx)?;
            let rest = self.best_from(&applied.with(i), &branch)?;
            let total = fee + rest;
            if total > best.fee {
                trace!(tx = %tx.hash().short(), %total, "new best continuation");
                best = Best {
                    fee: total,
                    next: Some(i),
                };
            }
        }

        self.memo.insert(applied.clone(), best);
        Ok(best.fee)
    }
}
