//! Transaction validation against a snapshot
//!
//! [`TxValidator::check`] decides whether one transaction is admissible on top
//! of a given [`UtxoPool`] and, if so, what fee it pays. It is a pure function
//! of its arguments: the same transaction can pass against one speculative
//! snapshot and fail against another derived from it.
//!
//! Checks, all of which must pass:
//!
//! 1. every input references an output present in the snapshot
//! 2. every input's signature verifies against that output's address
//! 3. no output is referenced by two inputs of the same transaction
//! 4. no output value is negative
//! 5. input value covers output value; the difference is the fee
//! 6. no output the transaction would mint already exists in the snapshot

use std::collections::HashSet;

use tally_core::{
    Amount, CanonicalPayload, Ed25519Verifier, Fee, OutputId, SignablePayload, SignatureVerifier,
    Transaction,
};
use thiserror::Error;
use tracing::trace;

use crate::pool::UtxoPool;

/// Why a transaction was not admitted
///
/// A routine outcome for stale or adversarial proposals, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Input references an output that is spent or never existed
    #[error("input {index} spends unknown output {id}")]
    MissingInput {
        /// Input position
        index: usize,
        /// Referenced identifier
        id: OutputId,
    },

    /// Input signature does not verify against the owner address
    #[error("input {index} carries an invalid signature")]
    BadSignature {
        /// Input position
        index: usize,
    },

    /// Two inputs reference the same output
    #[error("input {index} spends {id} a second time")]
    DoubleSpend {
        /// Position of the repeated input
        index: usize,
        /// Repeated identifier
        id: OutputId,
    },

    /// Output carries a negative value
    #[error("output {index} has negative value {value}")]
    NegativeOutput {
        /// Output position
        index: usize,
        /// Value found
        value: Amount,
    },

    /// Outputs are worth more than inputs
    #[error("outputs worth {outputs} exceed inputs worth {inputs}")]
    Deficit {
        /// Sum of spent values
        inputs: i128,
        /// Sum of created values
        outputs: i128,
    },

    /// An output this transaction mints is already unspent in the snapshot
    #[error("output {index} would recreate existing output {id}")]
    OutputExists {
        /// Output position
        index: usize,
        /// Colliding identifier
        id: OutputId,
    },
}

/// Stateless transaction validator
#[derive(Debug, Clone, Default)]
pub struct TxValidator<V = Ed25519Verifier, P = CanonicalPayload> {
    verifier: V,
    payload: P,
}

impl TxValidator {
    /// Validator with Ed25519 signatures over the canonical payload
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: SignatureVerifier, P: SignablePayload> TxValidator<V, P> {
    /// Validator with caller-supplied collaborators
    pub fn with_parts(verifier: V, payload: P) -> Self {
        Self { verifier, payload }
    }

    /// Fee paid by `tx` if admissible against `pool`
    pub fn check(&self, tx: &Transaction, pool: &UtxoPool) -> Result<Fee, Rejection> {
        let result = self.evaluate(tx, pool);
        if let Err(reason) = &result {
            trace!(tx = %tx.hash().short(), %reason, "transaction rejected");
        }
        result
    }

    /// Whether `tx` is admissible against `pool`
    pub fn is_valid(&self, tx: &Transaction, pool: &UtxoPool) -> bool {
        self.evaluate(tx, pool).is_ok()
    }

    fn evaluate(&self, tx: &Transaction, pool: &UtxoPool) -> Result<Fee, Rejection> {
        let mut claimed = HashSet::with_capacity(tx.inputs().len());
        let mut input_sum: i128 = 0;

        for (index, input) in tx.inputs().iter().enumerate() {
            let id = input.output_id();
            let spent = pool
                .get(&id)
                .ok_or(Rejection::MissingInput { index, id })?;

            let authorized = self
                .payload
                .signable_payload(tx, index)
                .is_some_and(|message| {
                    self.verifier
                        .verify(&spent.address, &message, &input.signature)
                });
            if !authorized {
                return Err(Rejection::BadSignature { index });
            }

            if !claimed.insert(id) {
                return Err(Rejection::DoubleSpend { index, id });
            }
            input_sum += spent.value.wide();
        }

        let mut output_sum: i128 = 0;
        for (index, (id, output)) in tx.minted().enumerate() {
            if output.value.is_negative() {
                return Err(Rejection::NegativeOutput {
                    index,
                    value: output.value,
                });
            }
            if pool.contains(&id) {
                return Err(Rejection::OutputExists { index, id });
            }
            output_sum += output.value.wide();
        }

        if input_sum < output_sum {
            return Err(Rejection::Deficit {
                inputs: input_sum,
                outputs: output_sum,
            });
        }
        Ok(Fee::from_units(input_sum - output_sum))
    }
}
