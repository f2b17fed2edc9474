//! UTXO pool: the ledger snapshot for one round
//!
//! A [`UtxoPool`] maps every unspent [`OutputId`] to its [`Output`]. It has
//! plain value semantics: cloning yields an independent snapshot, so a
//! speculative branch can diverge from its parent without touching it.
//! Iteration order is the identifier order, which keeps everything derived
//! from a pool deterministic.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use tally_core::{Output, OutputId, Transaction};

use crate::error::{LedgerError, Result};

/// Set of unspent outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PoolEntry>", into = "Vec<PoolEntry>")]
pub struct UtxoPool {
    utxos: BTreeMap<OutputId, Output>,
}

/// Serialized form of one pool entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Identifier of the unspent output
    pub id: OutputId,
    /// The output itself
    pub output: Output,
}

impl UtxoPool {
    /// Empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from entries, rejecting duplicates and negative values
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (OutputId, Output)>,
    {
        let mut pool = Self::new();
        for (id, output) in entries {
            pool.insert(id, output)?;
        }
        Ok(pool)
    }

    /// Whether `id` is unspent in this snapshot
    pub fn contains(&self, id: &OutputId) -> bool {
        self.utxos.contains_key(id)
    }

    /// Output behind `id`, if unspent
    pub fn get(&self, id: &OutputId) -> Option<&Output> {
        self.utxos.get(id)
    }

    /// Add a new unspent output
    pub fn insert(&mut self, id: OutputId, output: Output) -> Result<()> {
        if output.value.is_negative() {
            return Err(LedgerError::NegativeValue {
                id,
                value: output.value.units(),
            });
        }
        if self.utxos.contains_key(&id) {
            return Err(LedgerError::DuplicateOutput { id });
        }
        self.utxos.insert(id, output);
        Ok(())
    }

    /// Spend an output, returning it
    pub fn remove(&mut self, id: &OutputId) -> Result<Output> {
        self.utxos
            .remove(id)
            .ok_or(LedgerError::MissingOutput { id: *id })
    }

    /// Number of unspent outputs
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Whether the pool holds nothing
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Unspent outputs in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&OutputId, &Output)> {
        self.utxos.iter()
    }

    /// Sum of all unspent values
    pub fn total_value(&self) -> i128 {
        self.utxos.values().map(|o| o.value.wide()).sum()
    }

    /// Apply `tx`: spend its inputs and add its outputs
    ///
    /// All-or-nothing. Every spent identifier must be present (and distinct)
    /// and every minted identifier absent before anything changes. This does
    /// not check signatures or conservation; run the validator first.
    pub fn apply(&mut self, tx: &Transaction) -> Result<()> {
        let mut spent = HashSet::with_capacity(tx.inputs().len());
        for id in tx.spent_ids() {
            if !self.contains(&id) || !spent.insert(id) {
                return Err(LedgerError::MissingOutput { id });
            }
        }
        let mut minted = HashSet::with_capacity(tx.outputs().len());
        for (id, output) in tx.minted() {
            if output.value.is_negative() {
                return Err(LedgerError::NegativeValue {
                    id,
                    value: output.value.units(),
                });
            }
            // Spent-then-minted within one transaction cannot happen: a
            // transaction cannot reference its own hash.
            if self.contains(&id) || !minted.insert(id) {
                return Err(LedgerError::DuplicateOutput { id });
            }
        }

        for id in &spent {
            self.utxos.remove(id);
        }
        for (id, output) in tx.minted() {
            self.utxos.insert(id, *output);
        }
        Ok(())
    }

    /// New snapshot with `tx` applied, leaving `self` untouched
    pub fn with_applied(&self, tx: &Transaction) -> Result<Self> {
        let mut next = self.clone();
        next.apply(tx)?;
        Ok(next)
    }

    /// Sub-snapshot holding only the listed identifiers that are present
    pub fn restricted_to<'a, I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a OutputId>,
    {
        let utxos = ids
            .into_iter()
            .filter_map(|id| self.utxos.get(id).map(|output| (*id, *output)))
            .collect();
        Self { utxos }
    }
}

impl TryFrom<Vec<PoolEntry>> for UtxoPool {
    type Error = LedgerError;

    fn try_from(entries: Vec<PoolEntry>) -> Result<Self> {
        Self::from_entries(entries.into_iter().map(|e| (e.id, e.output)))
    }
}

impl From<UtxoPool> for Vec<PoolEntry> {
    fn from(pool: UtxoPool) -> Self {
        pool.utxos
            .into_iter()
            .map(|(id, output)| PoolEntry { id, output })
            .collect()
    }
}
