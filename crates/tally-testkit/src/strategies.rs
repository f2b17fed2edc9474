//! Property test strategies for candidate batches
//!
//! [`arb_round`] produces a starting snapshot plus a batch of signed
//! candidates that spend from it and from each other. Inputs are picked from
//! every output minted so far, so batches naturally contain conflicts,
//! dependency chains, repeated inputs, deficits and the occasional forged
//! signature.

use proptest::prelude::*;
use tally_core::{Output, OutputId, Transaction};

use crate::builders::TxBuilder;
use crate::fixtures::genesis;
use crate::keys::KeyFixture;

// Re-export proptest for convenience
pub use proptest;

const OWNERS: u8 = 3;

/// Starting entries and candidates for one round
#[derive(Debug, Clone)]
pub struct RoundSpec {
    /// Unspent outputs before the round
    pub entries: Vec<(OutputId, Output)>,
    /// Proposed transactions, in proposal order
    pub candidates: Vec<Transaction>,
}

#[derive(Debug, Clone)]
struct CandidatePlan {
    picks: Vec<usize>,
    outputs: Vec<i64>,
    forged: bool,
}

fn arb_plan() -> impl Strategy<Value = CandidatePlan> {
    (
        proptest::collection::vec(any::<usize>(), 1..=2),
        proptest::collection::vec(0i64..=12, 0..=2),
        proptest::bool::weighted(0.1),
    )
        .prop_map(|(picks, outputs, forged)| CandidatePlan {
            picks,
            outputs,
            forged,
        })
}

/// Random round with up to `max_genesis` starting outputs and up to
/// `max_candidates` proposals
pub fn arb_round(max_genesis: usize, max_candidates: usize) -> impl Strategy<Value = RoundSpec> {
    (
        proptest::collection::vec(1i64..=20, 1..=max_genesis.max(1)),
        proptest::collection::vec(arb_plan(), 0..=max_candidates),
    )
        .prop_map(|(values, plans)| build_round(&values, &plans))
}

fn owner(keys: &[KeyFixture], n: usize) -> &KeyFixture {
    &keys[n % keys.len()]
}

fn build_round(values: &[i64], plans: &[CandidatePlan]) -> RoundSpec {
    let keys: Vec<KeyFixture> = (0..OWNERS).map(KeyFixture::numbered).collect();

    let seeds: Vec<(i64, &KeyFixture)> = values
        .iter()
        .enumerate()
        .map(|(i, value)| (*value, owner(&keys, i)))
        .collect();
    let (_, entries) = genesis(&seeds);

    // Every output seen so far with the index of its owner key.
    let mut universe: Vec<(OutputId, usize)> = entries
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i % keys.len()))
        .collect();

    let mut candidates = Vec::with_capacity(plans.len());
    for plan in plans {
        let mut builder = TxBuilder::new();
        for pick in &plan.picks {
            let (id, key_index) = universe[pick % universe.len()];
            let signer = if plan.forged {
                owner(&keys, key_index + 1)
            } else {
                owner(&keys, key_index)
            };
            builder = builder.spend(id, signer);
        }
        for (j, value) in plan.outputs.iter().enumerate() {
            builder = builder.pay(*value, owner(&keys, j));
        }
        let tx = builder.build();
        universe.extend(
            tx.minted()
                .enumerate()
                .map(|(j, (id, _))| (id, j % keys.len())),
        );
        candidates.push(tx);
    }

    RoundSpec {
        entries,
        candidates,
    }
}
