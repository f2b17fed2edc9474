//! Transactions, outputs and output identifiers
//!
//! A [`Transaction`] is an ordered list of [`Input`]s and [`Output`]s plus a
//! content hash derived from both. The hash mints an [`OutputId`] for every
//! output position, which is how later transactions refer to what they spend.
//!
//! Two canonical byte layouts are defined here:
//!
//! - the **content encoding** hashed into the transaction hash, which covers
//!   signatures;
//! - the **signable payload** for one input position, which covers the
//!   referenced output id and every output but no signature, so a signature
//!   can be produced before the transaction is finished.

use serde::{Deserialize, Serialize};

use crate::address::{Address, Signature};
use crate::amount::Amount;
use crate::errors::{CoreError, Result};
use crate::hash::{hasher, TxHash};

const TX_DOMAIN: &[u8] = b"tally/tx/v1";
const INPUT_DOMAIN: &[u8] = b"tally/tx-input/v1";

/// Identifier of one spendable output: creating transaction hash and position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputId {
    /// Hash of the transaction that created the output
    pub tx_hash: TxHash,
    /// Position of the output in that transaction
    pub index: u32,
}

impl OutputId {
    /// Build an identifier
    pub const fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_hash.short(), self.index)
    }
}

/// Value assigned to an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Output {
    /// Amount held by the output
    pub value: Amount,
    /// Key allowed to spend it
    pub address: Address,
}

impl Output {
    /// Build an output
    pub fn new(value: impl Into<Amount>, address: Address) -> Self {
        Self {
            value: value.into(),
            address,
        }
    }
}

/// Reference to a spent output plus the owner's signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Input {
    /// Hash of the transaction that created the spent output
    pub prev_tx_hash: TxHash,
    /// Position of the spent output
    pub output_index: u32,
    /// Signature over the signable payload for this input position
    #[serde(default)]
    pub signature: Signature,
}

impl Input {
    /// Unsigned input spending `id`
    pub fn unsigned(id: OutputId) -> Self {
        Self {
            prev_tx_hash: id.tx_hash,
            output_index: id.index,
            signature: Signature::default(),
        }
    }

    /// Identifier of the output this input spends
    pub fn output_id(&self) -> OutputId {
        OutputId::new(self.prev_tx_hash, self.output_index)
    }
}

/// Inputs and outputs of a transaction without its hash
///
/// This is the shape used on the wire and while a transaction is still being
/// signed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Outputs being spent
    pub inputs: Vec<Input>,
    /// Outputs being created
    pub outputs: Vec<Output>,
}

impl TransactionBody {
    /// Bytes the owner of input `index` signs
    ///
    /// Returns `None` when `index` is out of range.
    pub fn signable_payload(&self, index: usize) -> Option<Vec<u8>> {
        let input = self.inputs.get(index)?;
        let mut buf = Vec::with_capacity(INPUT_DOMAIN.len() + 40 + self.outputs.len() * 40);
        buf.extend_from_slice(INPUT_DOMAIN);
        buf.extend_from_slice(input.prev_tx_hash.as_bytes());
        buf.extend_from_slice(&input.output_index.to_le_bytes());
        encode_outputs(&self.outputs, &mut buf);
        Some(buf)
    }

    fn content_hash(&self) -> TxHash {
        let mut h = hasher();
        h.update(TX_DOMAIN);
        h.update(&len_prefix(self.inputs.len()));
        for input in &self.inputs {
            h.update(input.prev_tx_hash.as_bytes());
            h.update(&input.output_index.to_le_bytes());
            h.update(&len_prefix(input.signature.as_bytes().len()));
            h.update(input.signature.as_bytes());
        }
        let mut outputs = Vec::with_capacity(4 + self.outputs.len() * 40);
        encode_outputs(&self.outputs, &mut outputs);
        h.update(&outputs);
        h.finalize()
    }
}

fn len_prefix(len: usize) -> [u8; 4] {
    // Saturation only matters for lists longer than u32::MAX, which
    // `Transaction::new` refuses for outputs.
    u32::try_from(len).unwrap_or(u32::MAX).to_le_bytes()
}

fn encode_outputs(outputs: &[Output], buf: &mut Vec<u8>) {
    buf.extend_from_slice(&len_prefix(outputs.len()));
    for output in outputs {
        buf.extend_from_slice(&output.value.units().to_le_bytes());
        buf.extend_from_slice(output.address.as_bytes());
    }
}

/// A finished transaction with its content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionBody", into = "TransactionBody")]
pub struct Transaction {
    body: TransactionBody,
    hash: TxHash,
}

impl Transaction {
    /// Finish a transaction, computing its hash
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>) -> Result<Self> {
        Self::from_body(TransactionBody { inputs, outputs })
    }

    /// Finish a transaction from a body
    pub fn from_body(body: TransactionBody) -> Result<Self> {
        if u32::try_from(body.outputs.len()).is_err() {
            return Err(CoreError::TooManyOutputs {
                count: body.outputs.len(),
            });
        }
        let hash = body.content_hash();
        Ok(Self { body, hash })
    }

    /// Content hash
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Inputs in order
    pub fn inputs(&self) -> &[Input] {
        &self.body.inputs
    }

    /// Outputs in order
    pub fn outputs(&self) -> &[Output] {
        &self.body.outputs
    }

    /// Borrow the body
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// Bytes the owner of input `index` signed
    pub fn signable_payload(&self, index: usize) -> Option<Vec<u8>> {
        self.body.signable_payload(index)
    }

    /// Identifier minted for output `index`
    pub fn output_id(&self, index: u32) -> OutputId {
        OutputId::new(self.hash, index)
    }

    /// Identifiers spent by the inputs, in input order
    pub fn spent_ids(&self) -> impl Iterator<Item = OutputId> + '_ {
        self.body.inputs.iter().map(Input::output_id)
    }

    /// Minted identifiers paired with their outputs, in output order
    pub fn minted(&self) -> impl Iterator<Item = (OutputId, &Output)> + '_ {
        // Output count fits in u32, checked in `from_body`.
        (0u32..)
            .zip(self.body.outputs.iter())
            .map(move |(index, output)| (self.output_id(index), output))
    }
}

impl TryFrom<TransactionBody> for Transaction {
    type Error = CoreError;

    fn try_from(body: TransactionBody) -> Result<Self> {
        Self::from_body(body)
    }
}

impl From<Transaction> for TransactionBody {
    fn from(tx: Transaction) -> Self {
        tx.body
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hash::Hash32;

    fn sample_body() -> TransactionBody {
        TransactionBody {
            inputs: vec![Input {
                prev_tx_hash: Hash32::new([1u8; 32]),
                output_index: 0,
                signature: Signature::from_bytes(vec![9u8; 64]),
            }],
            outputs: vec![
                Output::new(7, Address::from_bytes([2u8; 32])),
                Output::new(2, Address::from_bytes([3u8; 32])),
            ],
        }
    }

    #[test]
    fn hash_covers_signatures() {
        let signed = Transaction::from_body(sample_body()).unwrap();
        let mut body = sample_body();
        body.inputs[0].signature = Signature::from_bytes(vec![8u8; 64]);
        let resigned = Transaction::from_body(body).unwrap();
        assert_ne!(signed.hash(), resigned.hash());
    }

    #[test]
    fn payload_excludes_signatures() {
        let mut body = sample_body();
        let before = body.signable_payload(0).unwrap();
        body.inputs[0].signature = Signature::default();
        assert_eq!(body.signable_payload(0).unwrap(), before);
    }

    #[test]
    fn payload_depends_on_outputs() {
        let mut body = sample_body();
        let before = body.signable_payload(0).unwrap();
        body.outputs[0].value = Amount::from_units(8);
        assert_ne!(body.signable_payload(0).unwrap(), before);
    }

    #[test]
    fn payload_out_of_range_is_none() {
        assert!(sample_body().signable_payload(1).is_none());
    }

    #[test]
    fn minted_ids_follow_output_positions() {
        let tx = Transaction::from_body(sample_body()).unwrap();
        let ids: Vec<_> = tx.minted().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![tx.output_id(0), tx.output_id(1)]);
        assert!(ids.iter().all(|id| id.tx_hash == tx.hash()));
    }

    #[test]
    fn serde_recomputes_hash() {
        let tx = Transaction::from_body(sample_body()).unwrap();
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hash(), tx.hash());
        assert_eq!(back, tx);
    }
}
