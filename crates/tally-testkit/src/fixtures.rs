//! Starting snapshots

use tally_core::{Output, OutputId, Transaction};

use crate::keys::KeyFixture;

/// Mint the given outputs out of thin air
///
/// Returns the input-less minting transaction and its `(id, output)` entries,
/// ready for `UtxoPool::from_entries`.
pub fn genesis(outputs: &[(i64, &KeyFixture)]) -> (Transaction, Vec<(OutputId, Output)>) {
    let outputs: Vec<Output> = outputs
        .iter()
        .map(|(value, key)| Output::new(*value, key.address()))
        .collect();
    let tx = Transaction::new(Vec::new(), outputs).expect("genesis has few outputs");
    let entries = tx.minted().map(|(id, output)| (id, *output)).collect();
    (tx, entries)
}
