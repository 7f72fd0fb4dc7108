//! Canonical peer identifiers.
//!
//! A peer id is a multihash of the peer's marshalled public key. Small
//! keys (every Ed25519 key) are carried verbatim under the identity hash
//! code; larger keys (RSA) are sha2-256 hashed. The textual form is
//! base58btc of the multihash bytes.

use core::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Multihash code for the identity "hash".
const IDENTITY_CODE: u8 = 0x00;
/// Multihash code for sha2-256.
const SHA256_CODE: u8 = 0x12;
/// Marshalled keys up to this many bytes are inlined under the identity
/// code rather than hashed.
const MAX_INLINE_KEY_LEN: usize = 42;

/// Error when bytes do not form a valid peer-id multihash.
#[derive(Debug, Error)]
#[error("bytes are not a valid peer id multihash")]
pub struct InvalidPeerId;

/// Canonical identifier of a libp2p peer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PeerId(Vec<u8>);

impl PeerId {
    /// Derive the peer id of a marshalled (protobuf-encoded) public key.
    pub fn from_marshalled_key(key: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(2 + key.len().min(32));
        if key.len() <= MAX_INLINE_KEY_LEN {
            bytes.push(IDENTITY_CODE);
            bytes.push(key.len() as u8);
            bytes.extend_from_slice(key);
        } else {
            let digest = Sha256::digest(key);
            bytes.push(SHA256_CODE);
            bytes.push(32);
            bytes.extend_from_slice(&digest);
        }
        PeerId(bytes)
    }

    /// Parse raw multihash bytes, validating the header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InvalidPeerId> {
        match bytes.as_slice() {
            [IDENTITY_CODE, len, rest @ ..]
                if usize::from(*len) == rest.len() && rest.len() <= MAX_INLINE_KEY_LEN =>
            {
                Ok(PeerId(bytes))
            }
            [SHA256_CODE, 32, rest @ ..] if rest.len() == 32 => Ok(PeerId(bytes)),
            _ => Err(InvalidPeerId),
        }
    }

    /// The raw multihash bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw multihash bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({self})")
    }
}
