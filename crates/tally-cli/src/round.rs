//! Round files and the reports printed for them

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_core::{Fee, Transaction, TxHash};
use tally_ledger::{TxValidator, UtxoPool};
use tally_select::{MaxFeeSelector, SearchStats, SelectorConfig};
use tracing::info;

/// Starting snapshot plus the candidates proposed for one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundFile {
    /// Unspent outputs before the round
    pub snapshot: UtxoPool,
    /// Proposed transactions, in proposal order
    #[serde(default)]
    pub candidates: Vec<Transaction>,
}

/// Printed by `tally select`
#[derive(Debug, Serialize)]
pub struct SelectReport {
    /// Accepted transaction hashes in application order
    pub accepted: Vec<TxHash>,
    pub total_fee: Fee,
    pub stats: SearchStats,
    /// Snapshot after the round
    pub snapshot: UtxoPool,
}

/// One line of `tally validate` output
#[derive(Debug, Serialize, PartialEq)]
pub struct Verdict {
    pub hash: TxHash,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RoundFile {
    /// Read and decode a JSON round file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read round file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse round file {}", path.display()))
    }

    /// Run the selector and describe the committed outcome
    pub fn select(&self, config: SelectorConfig) -> Result<SelectReport> {
        let selector = MaxFeeSelector::new(config);
        let outcome = selector.select_and_apply(&self.candidates, &self.snapshot)?;
        Ok(SelectReport {
            accepted: outcome.accepted.iter().map(Transaction::hash).collect(),
            total_fee: outcome.total_fee,
            stats: outcome.stats,
            snapshot: outcome.snapshot,
        })
    }

    /// Judge each candidate on its own against the starting snapshot
    pub fn verdicts(&self) -> Vec<Verdict> {
        let validator = TxValidator::new();
        let verdicts: Vec<Verdict> = self
            .candidates
            .iter()
            .map(|tx| match validator.check(tx, &self.snapshot) {
                Ok(fee) => Verdict {
                    hash: tx.hash(),
                    valid: true,
                    fee: Some(fee),
                    reason: None,
                },
                Err(rejection) => Verdict {
                    hash: tx.hash(),
                    valid: false,
                    fee: None,
                    reason: Some(rejection.to_string()),
                },
            })
            .collect();
        info!(
            candidates = verdicts.len(),
            valid = verdicts.iter().filter(|v| v.valid).count(),
            "candidates checked"
        );
        verdicts
    }
}
