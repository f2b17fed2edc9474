//! Deterministic key fixtures

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use tally_core::{Address, Signature};

/// Ed25519 key pair for signing test inputs
#[derive(Debug, Clone)]
pub struct KeyFixture {
    signing_key: SigningKey,
    address: Address,
}

impl KeyFixture {
    /// Key derived directly from seed bytes
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address = Address::from(&signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Key derived from a label, e.g. `"alice"`
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        Self::from_seed(&seed)
    }

    /// Key numbered `n`, for generated test data
    pub fn numbered(n: u8) -> Self {
        Self::from_label(&format!("key-{n}"))
    }

    /// Address outputs owned by this key carry
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign raw bytes
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from(self.signing_key.sign(message))
    }
}
