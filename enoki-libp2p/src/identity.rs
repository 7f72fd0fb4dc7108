//! Long-term libp2p identities.
//!
//! The identity key is **not** the Noise static key. It signs the Noise
//! static key inside the handshake payload, proving that whoever controls
//! the long-term identity also controls this session's DH key. The
//! identity itself never participates in key derivation.

use ed25519_dalek::{Signer, Verifier};
use prost::Message;
use rand_core::CryptoRngCore;
use thiserror::Error;

use crate::peer_id::PeerId;

/// Errors from identity key handling and signature checks.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The protobuf key envelope does not parse.
    #[error("identity key envelope is malformed")]
    InvalidEnvelope,
    /// The envelope names a key algorithm this implementation lacks.
    #[error("unsupported identity key algorithm")]
    UnsupportedKeyType,
    /// The raw key bytes are not a valid key for the named algorithm.
    #[error("identity key bytes are invalid")]
    InvalidKey,
    /// A signature did not verify.
    #[error("signature verification failed")]
    SignatureInvalid,
    /// The signer refused or failed to produce a signature.
    #[error("signing failed")]
    SigningFailed,
}

/// Key algorithms registered in the libp2p keys envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum KeyType {
    Rsa = 0,
    Ed25519 = 1,
    Secp256k1 = 2,
    Ecdsa = 3,
}

/// The libp2p-marshalled public key: algorithm tag plus raw key bytes.
#[derive(Clone, PartialEq, Message)]
struct PublicKeyEnvelope {
    #[prost(enumeration = "KeyType", tag = "1")]
    key_type: i32,
    #[prost(bytes = "vec", tag = "2")]
    data: Vec<u8>,
}

/// A peer's long-term libp2p public key.
///
/// Ed25519 is implemented; envelopes carrying the other registered
/// algorithms decode to [`IdentityError::UnsupportedKeyType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519([u8; 32]),
}

impl PublicKey {
    /// Encode as the libp2p protobuf envelope.
    pub fn to_protobuf(&self) -> Vec<u8> {
        let PublicKey::Ed25519(bytes) = self;
        PublicKeyEnvelope {
            key_type: KeyType::Ed25519 as i32,
            data: bytes.to_vec(),
        }
        .encode_to_vec()
    }

    /// Decode a libp2p protobuf envelope, validating the key bytes.
    pub fn from_protobuf(bytes: &[u8]) -> Result<Self, IdentityError> {
        let envelope =
            PublicKeyEnvelope::decode(bytes).map_err(|_| IdentityError::InvalidEnvelope)?;
        match KeyType::try_from(envelope.key_type) {
            Ok(KeyType::Ed25519) => {
                let raw: [u8; 32] = envelope
                    .data
                    .as_slice()
                    .try_into()
                    .map_err(|_| IdentityError::InvalidKey)?;
                // Reject off-curve keys at decode time, not at first verify.
                ed25519_dalek::VerifyingKey::from_bytes(&raw)
                    .map_err(|_| IdentityError::InvalidKey)?;
                Ok(PublicKey::Ed25519(raw))
            }
            _ => Err(IdentityError::UnsupportedKeyType),
        }
    }

    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), IdentityError> {
        let PublicKey::Ed25519(raw) = self;
        let key =
            ed25519_dalek::VerifyingKey::from_bytes(raw).map_err(|_| IdentityError::InvalidKey)?;
        let signature = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|_| IdentityError::SignatureInvalid)?;
        key.verify(message, &signature)
            .map_err(|_| IdentityError::SignatureInvalid)
    }

    /// Derive the canonical peer id of this key.
    pub fn to_peer_id(&self) -> PeerId {
        PeerId::from_marshalled_key(&self.to_protobuf())
    }
}

/// A long-term libp2p identity able to sign handshake payloads.
///
/// The handshake borrows the provider, it never owns it: one identity
/// typically signs for many concurrent handshakes. `sign` is async so
/// that implementations backed by a remote signer or hardware device can
/// suspend; [`Ed25519Identity`] answers immediately.
#[allow(async_fn_in_trait)]
pub trait PeerIdentity {
    /// The public half of this identity.
    fn public_key(&self) -> PublicKey;

    /// Sign `message` with the identity's private key.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError>;

    /// The canonical peer id of this identity.
    fn peer_id(&self) -> PeerId {
        self.public_key().to_peer_id()
    }
}

/// An in-process Ed25519 identity.
pub struct Ed25519Identity {
    keypair: ed25519_dalek::SigningKey,
}

impl Ed25519Identity {
    /// Generate a fresh identity.
    pub fn generate(rng: &mut impl CryptoRngCore) -> Self {
        Self {
            keypair: ed25519_dalek::SigningKey::generate(rng),
        }
    }

    /// Reconstruct an identity from raw 32-byte secret key material.
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            keypair: ed25519_dalek::SigningKey::from_bytes(secret),
        }
    }
}

impl PeerIdentity for Ed25519Identity {
    fn public_key(&self) -> PublicKey {
        PublicKey::Ed25519(self.keypair.verifying_key().to_bytes())
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        Ok(self.keypair.sign(message).to_bytes().to_vec())
    }
}
