//! Transaction authenticity: ECDSA P-256 over SHA-256 of the transaction's
//! canonical JSON, plus the wallet-side signing key.

use crate::constants::{PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
use crate::error::{KeyError, SigningError};
use crate::Transaction;
use ring::rand::SystemRandom;
use ring::signature::{
    EcdsaKeyPair, KeyPair, UnparsedPublicKey, ECDSA_P256_SHA256_FIXED,
    ECDSA_P256_SHA256_FIXED_SIGNING,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// SEC1 tag for an uncompressed curve point.
const UNCOMPRESSED_POINT: u8 = 0x04;

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], KeyError> {
    bytes.try_into().map_err(|_| KeyError::Length {
        expected: N,
        actual: bytes.len(),
    })
}

/// A P-256 public key as its affine coordinates X‖Y.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        Ok(Self(fixed(&hex::decode(s)?)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn sec1(&self) -> [u8; PUBLIC_KEY_SIZE + 1] {
        let mut point = [0u8; PUBLIC_KEY_SIZE + 1];
        point[0] = UNCOMPRESSED_POINT;
        point[1..].copy_from_slice(&self.0);
        point
    }
}

/// A fixed-width ECDSA signature r‖s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_SIZE]);

impl Signature {
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        Ok(Self(fixed(&hex::decode(s)?)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

pub fn verify(public_key: &PublicKey, signature: &Signature, tx: &Transaction) -> bool {
    let point = public_key.sec1();
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, &point[..])
        .verify(&tx.signing_bytes(), &signature.0)
        .is_ok()
}

/// Wire form of a signed transfer (`PUT`/`POST /transactions`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender: String,
    pub recipient: String,
    pub sender_public_key: String,
    pub value: f64,
    pub signature: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransfer {
    pub transaction: Transaction,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl SignedTransfer {
    pub fn verify(&self) -> bool {
        verify(&self.public_key, &self.signature, &self.transaction)
    }

    pub fn to_request(&self) -> TransferRequest {
        TransferRequest {
            sender: self.transaction.sender.clone(),
            recipient: self.transaction.recipient.clone(),
            sender_public_key: self.public_key.to_hex(),
            value: self.transaction.value,
            signature: self.signature.to_hex(),
        }
    }
}

impl TryFrom<TransferRequest> for SignedTransfer {
    type Error = KeyError;

    fn try_from(req: TransferRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            public_key: PublicKey::from_hex(&req.sender_public_key)?,
            signature: Signature::from_hex(&req.signature)?,
            transaction: Transaction::new(req.sender, req.recipient, req.value),
        })
    }
}

/// Something asking to enter the pool. A reward has no signature to check;
/// a transfer is always verified, whatever its sender string says.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Reward { recipient: String, value: f64 },
    Transfer(SignedTransfer),
}

impl Submission {
    /// The pooled transaction, or `None` when the submission is rejected.
    pub fn admit(self) -> Option<Transaction> {
        let tx = match self {
            Submission::Reward { recipient, value } => Transaction::reward(recipient, value),
            Submission::Transfer(transfer) => {
                if !transfer.verify() {
                    warn!(sender = %transfer.transaction.sender, "signature verification failed");
                    return None;
                }
                transfer.transaction
            }
        };
        if !(tx.value.is_finite() && tx.value >= 0.0) {
            warn!(value = tx.value, "rejecting transaction with invalid value");
            return None;
        }
        Some(tx)
    }
}

/// Wallet-side P-256 key.
pub struct SigningKey {
    pair: EcdsaKeyPair,
    pkcs8: Vec<u8>,
}

impl SigningKey {
    pub fn generate() -> Result<Self, SigningError> {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
            .map_err(|_| SigningError::KeyGeneration)?;
        Self::from_pkcs8(document.as_ref()).map_err(|_| SigningError::KeyGeneration)
    }

    pub fn from_pkcs8(bytes: &[u8]) -> Result<Self, KeyError> {
        let pair = EcdsaKeyPair::from_pkcs8(
            &ECDSA_P256_SHA256_FIXED_SIGNING,
            bytes,
            &SystemRandom::new(),
        )
        .map_err(|_| KeyError::Pkcs8)?;
        Ok(Self {
            pair,
            pkcs8: bytes.to_vec(),
        })
    }

    pub fn from_pkcs8_hex(s: &str) -> Result<Self, KeyError> {
        Self::from_pkcs8(&hex::decode(s.trim())?)
    }

    pub fn pkcs8_hex(&self) -> String {
        hex::encode(&self.pkcs8)
    }

    pub fn public_key(&self) -> PublicKey {
        // ring always hands back the 65-byte uncompressed point for P-256.
        let point = self.pair.public_key().as_ref();
        let mut xy = [0u8; PUBLIC_KEY_SIZE];
        xy.copy_from_slice(&point[1..]);
        PublicKey(xy)
    }

    pub fn sign(&self, tx: &Transaction) -> Result<Signature, SigningError> {
        let sig = self
            .pair
            .sign(&SystemRandom::new(), &tx.signing_bytes())
            .map_err(|_| SigningError::Sign)?;
        fixed(sig.as_ref())
            .map(Signature)
            .map_err(|_| SigningError::Sign)
    }

    pub fn transfer(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        value: f64,
    ) -> Result<SignedTransfer, SigningError> {
        let transaction = Transaction::new(sender, recipient, value);
        let signature = self.sign(&transaction)?;
        Ok(SignedTransfer {
            transaction,
            public_key: self.public_key(),
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MINING_SENDER;

    #[test]
    fn signed_transfer_verifies() {
        let key = SigningKey::generate().unwrap();
        let transfer = key.transfer("alice", "bob", 5.0).unwrap();
        assert!(transfer.verify());
        assert_eq!(transfer.public_key.to_hex().len(), 128);
        assert_eq!(transfer.signature.to_hex().len(), 128);
    }

    #[test]
    fn tampered_value_fails_verification() {
        let key = SigningKey::generate().unwrap();
        let mut transfer = key.transfer("alice", "bob", 5.0).unwrap();
        transfer.transaction.value = 50.0;
        assert!(!transfer.verify());
    }

    #[test]
    fn foreign_key_fails_verification() {
        let alice = SigningKey::generate().unwrap();
        let mallory = SigningKey::generate().unwrap();
        let mut transfer = alice.transfer("alice", "bob", 5.0).unwrap();
        transfer.public_key = mallory.public_key();
        assert!(!transfer.verify());
    }

    #[test]
    fn request_round_trip_preserves_validity() {
        let key = SigningKey::generate().unwrap();
        let transfer = key.transfer("alice", "bob", 2.25).unwrap();
        let parsed = SignedTransfer::try_from(transfer.to_request()).unwrap();
        assert_eq!(parsed, transfer);
        assert!(parsed.verify());
    }

    #[test]
    fn malformed_key_material_is_a_key_error() {
        assert!(matches!(PublicKey::from_hex("zz"), Err(KeyError::Hex(_))));
        assert!(matches!(
            PublicKey::from_hex(&"ab".repeat(65)),
            Err(KeyError::Length {
                expected: 64,
                actual: 65
            })
        ));
        assert!(matches!(
            Signature::from_hex(&"00".repeat(10)),
            Err(KeyError::Length { .. })
        ));
        assert!(matches!(
            SigningKey::from_pkcs8(&[1, 2, 3]),
            Err(KeyError::Pkcs8)
        ));
    }

    #[test]
    fn pkcs8_hex_reloads_the_same_key() {
        let key = SigningKey::generate().unwrap();
        let reloaded = SigningKey::from_pkcs8_hex(&key.pkcs8_hex()).unwrap();
        assert_eq!(reloaded.public_key(), key.public_key());
    }

    #[test]
    fn reward_is_admitted_without_signature() {
        let tx = Submission::Reward {
            recipient: "miner".into(),
            value: 1.0,
        }
        .admit()
        .unwrap();
        assert_eq!(tx.sender, MINING_SENDER);
    }

    #[test]
    fn sentinel_sender_does_not_bypass_transfer_checks() {
        let key = SigningKey::generate().unwrap();
        let mut transfer = key.transfer("alice", "bob", 5.0).unwrap();
        transfer.transaction.sender = MINING_SENDER.to_string();
        assert!(Submission::Transfer(transfer).admit().is_none());
    }

    #[test]
    fn negative_or_non_finite_values_are_rejected() {
        let key = SigningKey::generate().unwrap();
        let negative = key.transfer("alice", "bob", -1.0).unwrap();
        assert!(negative.verify());
        assert!(Submission::Transfer(negative).admit().is_none());
        let reward = Submission::Reward {
            recipient: "miner".into(),
            value: f64::NAN,
        };
        assert!(reward.admit().is_none());
    }
}
