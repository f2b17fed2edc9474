//! Signed transaction builder
//!
//! ```rust
//! use tally_testkit::{genesis, KeyFixture, TxBuilder};
//!
//! let alice = KeyFixture::from_label("alice");
//! let bob = KeyFixture::from_label("bob");
//! let (_, entries) = genesis(&[(10, &alice)]);
//!
//! let tx = TxBuilder::new()
//!     .spend(entries[0].0, &alice)
//!     .pay(7, &bob)
//!     .build();
//! assert_eq!(tx.inputs().len(), 1);
//! ```

use tally_core::{Address, Input, Output, OutputId, Signature, Transaction, TransactionBody};

use crate::keys::KeyFixture;

enum Signing {
    Key(KeyFixture),
    Raw(Signature),
    Unsigned,
}

/// Builds transactions and signs each input over its canonical payload
pub struct TxBuilder {
    body: TransactionBody,
    signing: Vec<Signing>,
}

impl Default for TxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TxBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self {
            body: TransactionBody::default(),
            signing: Vec::new(),
        }
    }

    /// Spend `id`, signing with `key`
    pub fn spend(self, id: OutputId, key: &KeyFixture) -> Self {
        self.push_input(id, Signing::Key(key.clone()))
    }

    /// Spend `id` with a fixed signature
    pub fn spend_with_signature(self, id: OutputId, signature: Signature) -> Self {
        self.push_input(id, Signing::Raw(signature))
    }

    /// Spend `id` without any signature
    pub fn spend_unsigned(self, id: OutputId) -> Self {
        self.push_input(id, Signing::Unsigned)
    }

    /// Pay `value` to `key`
    pub fn pay(self, value: i64, key: &KeyFixture) -> Self {
        self.pay_to(value, key.address())
    }

    /// Pay `value` to a raw address
    pub fn pay_to(mut self, value: i64, address: Address) -> Self {
        self.body.outputs.push(Output::new(value, address));
        self
    }

    /// Sign the inputs and finish the transaction
    pub fn build(self) -> Transaction {
        let Self { mut body, signing } = self;
        let signatures: Vec<Signature> = signing
            .into_iter()
            .enumerate()
            .map(|(index, signing)| match signing {
                Signing::Key(key) => {
                    let payload = body
                        .signable_payload(index)
                        .expect("input index is in range");
                    key.sign(&payload)
                }
                Signing::Raw(signature) => signature,
                Signing::Unsigned => Signature::default(),
            })
            .collect();
        for (input, signature) in body.inputs.iter_mut().zip(signatures) {
            input.signature = signature;
        }
        Transaction::from_body(body).expect("test transactions have few outputs")
    }

    fn push_input(mut self, id: OutputId, signing: Signing) -> Self {
        self.body.inputs.push(Input::unsigned(id));
        self.signing.push(signing);
        self
    }
}

/// Copy of `tx` with byte `byte` of input `index`'s signature flipped
pub fn with_corrupted_signature(tx: &Transaction, index: usize, byte: usize) -> Transaction {
    let mut body = tx.body().clone();
    let sig = &mut body.inputs[index].signature.0;
    let position = byte % sig.len().max(1);
    if sig.is_empty() {
        sig.push(0xff);
    } else {
        sig[position] ^= 0x01;
    }
    Transaction::from_body(body).expect("test transactions have few outputs")
}
