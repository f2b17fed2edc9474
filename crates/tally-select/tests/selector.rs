//! Round selection scenarios.

#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]

use std::cell::Cell;

use assert_matches::assert_matches;
use tally_core::{
    Address, CanonicalPayload, Ed25519Verifier, Fee, OutputId, Signature, SignatureVerifier,
    Transaction,
};
use tally_ledger::{TxValidator, UtxoPool};
use tally_select::{
    MaxFeeSelector, RoundOutcome, SelectError, SelectionStrategy, SelectorConfig,
};
use tally_testkit::{genesis, KeyFixture, TxBuilder};

fn max_fee() -> MaxFeeSelector {
    MaxFeeSelector::new(SelectorConfig::default())
}

fn greedy() -> MaxFeeSelector {
    MaxFeeSelector::new(SelectorConfig {
        strategy: SelectionStrategy::Greedy,
        ..SelectorConfig::default()
    })
}

fn pool_of(values: &[(i64, &KeyFixture)]) -> (UtxoPool, Vec<OutputId>) {
    let (_, entries) = genesis(values);
    let ids = entries.iter().map(|(id, _)| *id).collect();
    (UtxoPool::from_entries(entries).unwrap(), ids)
}

fn hashes(txs: &[Transaction]) -> Vec<tally_core::TxHash> {
    txs.iter().map(Transaction::hash).collect()
}

fn replay(outcome: &RoundOutcome, pool: &UtxoPool) -> UtxoPool {
    let validator = TxValidator::new();
    let mut running = pool.clone();
    for tx in &outcome.accepted {
        assert!(validator.is_valid(tx, &running), "chain order must stay valid");
        running.apply(tx).unwrap();
    }
    running
}

#[test]
fn higher_fee_wins_a_conflict() {
    let k1 = KeyFixture::from_label("k1");
    let (pool, ids) = pool_of(&[(10, &k1)]);
    let o1 = ids[0];

    let tx1 = TxBuilder::new().spend(o1, &k1).pay(7, &k1).build();
    let tx2 = TxBuilder::new().spend(o1, &k1).pay(9, &k1).build();

    let outcome = max_fee()
        .select_and_apply(&[tx1.clone(), tx2.clone()], &pool)
        .unwrap();

    assert_eq!(hashes(&outcome.accepted), vec![tx1.hash()]);
    assert_eq!(outcome.total_fee, Fee::from_units(3));
    let snapshot = &outcome.snapshot;
    assert!(snapshot.contains(&tx1.output_id(0)));
    assert!(!snapshot.contains(&o1));
    assert!(!snapshot.contains(&tx2.output_id(0)));
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn two_compatible_beat_one_richer_conflict() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k), (10, &k)]);

    // a spends both coins for fee 5; b and c each spend one for 3 + 4.
    let a = TxBuilder::new()
        .spend(ids[0], &k)
        .spend(ids[1], &k)
        .pay(15, &k)
        .build();
    let b = TxBuilder::new().spend(ids[0], &k).pay(7, &k).build();
    let c = TxBuilder::new().spend(ids[1], &k).pay(6, &k).build();
    let batch = vec![a.clone(), b.clone(), c.clone()];

    let best = max_fee().select_and_apply(&batch, &pool).unwrap();
    let mut chosen = hashes(&best.accepted);
    chosen.sort();
    let mut expected = vec![b.hash(), c.hash()];
    expected.sort();
    assert_eq!(chosen, expected);
    assert_eq!(best.total_fee, Fee::from_units(7));

    // Taking the first valid candidate settles for a alone.
    let first_fit = greedy().select_and_apply(&batch, &pool).unwrap();
    assert_eq!(hashes(&first_fit.accepted), vec![a.hash()]);
    assert_eq!(first_fit.total_fee, Fee::from_units(5));
}

#[test]
fn dependent_chain_is_ordered_parent_first() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);

    let parent = TxBuilder::new().spend(ids[0], &k).pay(9, &k).build();
    let child = TxBuilder::new()
        .spend(parent.output_id(0), &k)
        .pay(1, &k)
        .build();
    let rival = TxBuilder::new().spend(ids[0], &k).pay(5, &k).build();

    // Child proposed before its parent.
    let batch = vec![child.clone(), rival, parent.clone()];
    let outcome = max_fee().select_and_apply(&batch, &pool).unwrap();

    assert_eq!(hashes(&outcome.accepted), vec![parent.hash(), child.hash()]);
    assert_eq!(outcome.total_fee, Fee::from_units(9));
    assert_eq!(replay(&outcome, &pool), outcome.snapshot);
}

#[test]
fn zero_fee_parent_is_taken_when_it_unlocks_fees() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);

    let relay = TxBuilder::new().spend(ids[0], &k).pay(10, &k).build();
    let payout = TxBuilder::new()
        .spend(relay.output_id(0), &k)
        .pay(8, &k)
        .build();
    let outcome = max_fee()
        .select_and_apply(&[relay.clone(), payout.clone()], &pool)
        .unwrap();
    assert_eq!(hashes(&outcome.accepted), vec![relay.hash(), payout.hash()]);
    assert_eq!(outcome.total_fee, Fee::from_units(2));
}

#[test]
fn zero_fee_alone_is_not_taken() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);
    let relay = TxBuilder::new().spend(ids[0], &k).pay(10, &k).build();

    let outcome = max_fee().select_and_apply(&[relay], &pool).unwrap();
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.snapshot, pool);
}

#[test]
fn empty_batch_changes_nothing() {
    let k = KeyFixture::from_label("k");
    let (pool, _) = pool_of(&[(10, &k), (3, &k)]);

    let outcome = max_fee().select_and_apply(&[], &pool).unwrap();
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.total_fee, Fee::ZERO);
    assert_eq!(outcome.snapshot, pool);
    assert_eq!(outcome.stats.components, 0);
}

#[test]
fn invalid_candidates_are_skipped_not_errors() {
    let k = KeyFixture::from_label("k");
    let mallory = KeyFixture::from_label("mallory");
    let (pool, ids) = pool_of(&[(10, &k)]);

    let forged = TxBuilder::new().spend(ids[0], &mallory).pay(1, &mallory).build();
    let overdrawn = TxBuilder::new().spend(ids[0], &k).pay(11, &k).build();
    let outcome = max_fee()
        .select_and_apply(&[forged, overdrawn], &pool)
        .unwrap();
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.stats.rejections, 2);
}

#[test]
fn repeated_candidate_is_admitted_once() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);
    let tx = TxBuilder::new().spend(ids[0], &k).pay(4, &k).build();

    let outcome = max_fee()
        .select_and_apply(&[tx.clone(), tx.clone(), tx.clone()], &pool)
        .unwrap();
    assert_eq!(hashes(&outcome.accepted), vec![tx.hash()]);
    assert_eq!(outcome.stats.candidates, 3);
    assert_eq!(outcome.stats.distinct, 1);
}

#[test]
fn independent_candidates_are_separate_components() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k), (10, &k), (10, &k)]);
    let a = TxBuilder::new().spend(ids[0], &k).pay(9, &k).build();
    let b = TxBuilder::new().spend(ids[1], &k).pay(8, &k).build();
    let c = TxBuilder::new().spend(ids[2], &k).pay(7, &k).build();

    let outcome = max_fee()
        .select_and_apply(&[c.clone(), a.clone(), b.clone()], &pool)
        .unwrap();
    assert_eq!(outcome.stats.components, 3);
    assert_eq!(hashes(&outcome.accepted), vec![c.hash(), a.hash(), b.hash()]);
    assert_eq!(outcome.total_fee, Fee::from_units(6));
}

#[test]
fn equal_fees_keep_the_earlier_candidate() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);
    let first = TxBuilder::new().spend(ids[0], &k).pay(6, &k).build();
    let second = TxBuilder::new().spend(ids[0], &k).pay(4, &k).pay(2, &k).build();

    let outcome = max_fee()
        .select_and_apply(&[first.clone(), second.clone()], &pool)
        .unwrap();
    assert_eq!(hashes(&outcome.accepted), vec![first.hash()]);

    let outcome = max_fee()
        .select_and_apply(&[second.clone(), first], &pool)
        .unwrap();
    assert_eq!(hashes(&outcome.accepted), vec![second.hash()]);
}

#[test]
fn input_snapshot_is_left_alone() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);
    let before = pool.clone();
    let tx = TxBuilder::new().spend(ids[0], &k).pay(4, &k).build();

    let outcome = max_fee().select_and_apply(&[tx], &pool).unwrap();
    assert_eq!(pool, before);
    assert_ne!(outcome.snapshot, pool);
}

#[test]
fn search_budget_is_enforced() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);
    let a = TxBuilder::new().spend(ids[0], &k).pay(7, &k).build();
    let b = TxBuilder::new().spend(ids[0], &k).pay(8, &k).build();

    let tight = MaxFeeSelector::new(SelectorConfig {
        max_search_states: Some(1),
        ..SelectorConfig::default()
    });
    assert_matches!(
        tight.select_and_apply(&[a.clone(), b.clone()], &pool),
        Err(SelectError::SearchBudgetExceeded { limit: 1 })
    );

    let roomy = MaxFeeSelector::new(SelectorConfig {
        max_search_states: Some(16),
        ..SelectorConfig::default()
    });
    let outcome = roomy.select_and_apply(&[a.clone(), b], &pool).unwrap();
    assert_eq!(hashes(&outcome.accepted), vec![a.hash()]);
}

#[test]
fn round_total_beyond_amount_range_is_committed() {
    let whale = KeyFixture::from_label("whale");
    let (pool, ids) = pool_of(&[(i64::MAX, &whale), (i64::MAX, &whale)]);
    let a = TxBuilder::new().spend(ids[0], &whale).pay(0, &whale).build();
    let b = TxBuilder::new().spend(ids[1], &whale).pay(0, &whale).build();

    let outcome = max_fee().select_and_apply(&[a, b], &pool).unwrap();
    assert_eq!(outcome.accepted.len(), 2);
    assert_eq!(outcome.total_fee, Fee::from_units(2 * i64::MAX as i128));
    assert_eq!(outcome.snapshot.total_value(), 0);
}

/// Genuine Ed25519 checks that start refusing once `allowed` calls are used up
struct Exhausting {
    allowed: Cell<usize>,
}

impl SignatureVerifier for Exhausting {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool {
        let left = self.allowed.get();
        if left == 0 {
            return false;
        }
        self.allowed.set(left - 1);
        Ed25519Verifier.verify(address, message, signature)
    }
}

#[test]
fn chain_refused_at_commit_aborts_the_round() {
    let k = KeyFixture::from_label("k");
    let (pool, ids) = pool_of(&[(10, &k)]);
    let tx = TxBuilder::new().spend(ids[0], &k).pay(4, &k).build();

    // One verification for the search; the commit re-check is refused.
    let validator = TxValidator::with_parts(
        Exhausting {
            allowed: Cell::new(1),
        },
        CanonicalPayload,
    );
    let selector = MaxFeeSelector::with_validator(validator, SelectorConfig::default());
    assert_matches!(
        selector.select_and_apply(&[tx], &pool),
        Err(SelectError::CommitRejected { .. })
    );
}
