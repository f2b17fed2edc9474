//! Signature verification and signable payload seams
//!
//! Admission only ever *checks* signatures. Both the verification primitive
//! and the payload derivation are traits so a round driver can supply its
//! own; the defaults are Ed25519 over the canonical payload from
//! [`TransactionBody::signable_payload`](crate::TransactionBody::signable_payload).

use ed25519_dalek::{Verifier, VerifyingKey};

use crate::address::{Address, Signature};
use crate::transaction::Transaction;

/// Signature verification oracle
///
/// Must be a pure function of its arguments. A malformed key or signature is
/// a `false`, never a panic.
pub trait SignatureVerifier {
    /// Whether `signature` over `message` was made by the key behind `address`
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool {
        (**self).verify(address, message, signature)
    }
}

/// Derivation of the bytes signed for one input position
pub trait SignablePayload {
    /// Payload for input `index` of `tx`, `None` if there is no such input
    fn signable_payload(&self, tx: &Transaction, index: usize) -> Option<Vec<u8>>;
}

/// Ed25519 verification via `ed25519-dalek`
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &Address, message: &[u8], signature: &Signature) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(address.as_bytes()) else {
            return false;
        };
        let Ok(sig) = ed25519_dalek::Signature::from_slice(signature.as_bytes()) else {
            return false;
        };
        key.verify(message, &sig).is_ok()
    }
}

/// Canonical payload defined by the transaction encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalPayload;

impl SignablePayload for CanonicalPayload {
    fn signable_payload(&self, tx: &Transaction, index: usize) -> Option<Vec<u8>> {
        tx.signable_payload(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn ed25519_accepts_genuine_signature() {
        let signing = key(1);
        let address = Address::from(&signing.verifying_key());
        let sig = Signature::from(signing.sign(b"payload"));
        assert!(Ed25519Verifier.verify(&address, b"payload", &sig));
    }

    #[test]
    fn ed25519_rejects_wrong_key_and_message() {
        let signing = key(1);
        let sig = Signature::from(signing.sign(b"payload"));
        let other = Address::from(&key(2).verifying_key());
        let own = Address::from(&signing.verifying_key());
        assert!(!Ed25519Verifier.verify(&other, b"payload", &sig));
        assert!(!Ed25519Verifier.verify(&own, b"payloae", &sig));
    }

    #[test]
    fn malformed_inputs_are_false_not_panics() {
        let own = Address::from(&key(1).verifying_key());
        assert!(!Ed25519Verifier.verify(&own, b"x", &Signature::from_bytes(vec![1, 2, 3])));
        assert!(!Ed25519Verifier.verify(&own, b"x", &Signature::default()));
    }
}
