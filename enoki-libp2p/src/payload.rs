//! The libp2p handshake payload.
//!
//! Carried encrypted in XX messages 2 and 3, the payload is what turns a
//! key agreement between anonymous DH keys into a mutually authenticated
//! libp2p connection: it contains the sender's marshalled identity key
//! and a signature, under that identity, of the sender's Noise static
//! key with a fixed domain-separation prefix.

use prost::Message;

use crate::error::PayloadError;
use crate::identity::{IdentityError, PeerIdentity, PublicKey};
use crate::peer_id::PeerId;

/// Domain-separation prefix for the static-key proof (24 ASCII bytes, no
/// terminator).
pub const STATIC_KEY_DOMAIN: &[u8] = b"noise-libp2p-static-key:";
/// Domain-separation prefix for the optional early-data proof.
pub const EARLY_DATA_DOMAIN: &[u8] = b"noise-libp2p-early-data:";

/// Wire form of the handshake payload.
///
/// Fields encode in ascending tag order; unknown tags are skipped on
/// decode, so future extensions never break this parser.
#[derive(Clone, PartialEq, Message)]
pub struct HandshakePayload {
    /// Marshalled long-term identity public key.
    #[prost(bytes = "vec", tag = "1")]
    pub identity_key: Vec<u8>,
    /// Signature over `"noise-libp2p-static-key:" || noise_static_public`.
    #[prost(bytes = "vec", tag = "2")]
    pub identity_sig: Vec<u8>,
    /// Optional application data authenticated inside the handshake.
    #[prost(bytes = "vec", optional, tag = "3")]
    pub early_data: Option<Vec<u8>>,
    /// Signature over `"noise-libp2p-early-data:" || early_data`.
    #[prost(bytes = "vec", optional, tag = "4")]
    pub early_data_sig: Option<Vec<u8>>,
}

/// The authenticated remote side after successful payload verification.
#[derive(Debug, Clone)]
pub struct RemoteIdentity {
    /// The remote's long-term public key.
    pub public_key: PublicKey,
    /// Peer id derived from `public_key`.
    pub peer_id: PeerId,
    /// Early data, present only if it arrived with a valid signature.
    pub early_data: Option<Vec<u8>>,
}

/// Build and sign the local payload for `noise_static_public`.
///
/// Signing happens through the identity provider and may suspend; the
/// result is the encoded record ready for `EncryptAndHash`.
pub async fn build<I: PeerIdentity>(
    identity: &I,
    noise_static_public: &[u8; 32],
    early_data: Option<&[u8]>,
) -> Result<Vec<u8>, IdentityError> {
    let identity_sig = identity
        .sign(&signed_static_key(noise_static_public))
        .await?;

    let mut payload = HandshakePayload {
        identity_key: identity.public_key().to_protobuf(),
        identity_sig,
        early_data: None,
        early_data_sig: None,
    };

    if let Some(data) = early_data {
        payload.early_data_sig = Some(identity.sign(&signed_early_data(data)).await?);
        payload.early_data = Some(data.to_vec());
    }

    Ok(payload.encode_to_vec())
}

/// Verify a received payload against the Noise static key learned in the
/// same handshake message.
///
/// Checks run in a fixed order: parse, derive the peer id, compare it
/// with `expected_peer` if one was supplied, then verify the static-key
/// signature and (if present) the early-data signature.
pub fn verify(
    payload: &[u8],
    remote_static: &[u8; 32],
    expected_peer: Option<&PeerId>,
) -> Result<RemoteIdentity, PayloadError> {
    let payload = HandshakePayload::decode(payload).map_err(|_| PayloadError::Decode)?;
    if payload.identity_key.is_empty() || payload.identity_sig.is_empty() {
        return Err(PayloadError::Decode);
    }

    let public_key = PublicKey::from_protobuf(&payload.identity_key).map_err(|err| match err {
        IdentityError::UnsupportedKeyType => PayloadError::UnsupportedKeyType,
        _ => PayloadError::Decode,
    })?;

    let peer_id = public_key.to_peer_id();
    if let Some(expected) = expected_peer {
        if *expected != peer_id {
            return Err(PayloadError::PeerIdMismatch);
        }
    }

    public_key
        .verify(&signed_static_key(remote_static), &payload.identity_sig)
        .map_err(|_| PayloadError::StaticKeyNotAuthenticated)?;

    let early_data = match payload.early_data_sig {
        Some(sig) => {
            let data = payload.early_data.unwrap_or_default();
            public_key
                .verify(&signed_early_data(&data), &sig)
                .map_err(|_| PayloadError::EarlyDataNotAuthenticated)?;
            Some(data)
        }
        // Unsigned early data carries no authentication and is dropped.
        None => None,
    };

    Ok(RemoteIdentity {
        public_key,
        peer_id,
        early_data,
    })
}

fn signed_static_key(noise_static_public: &[u8; 32]) -> Vec<u8> {
    let mut message = Vec::with_capacity(STATIC_KEY_DOMAIN.len() + noise_static_public.len());
    message.extend_from_slice(STATIC_KEY_DOMAIN);
    message.extend_from_slice(noise_static_public);
    message
}

fn signed_early_data(data: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(EARLY_DATA_DOMAIN.len() + data.len());
    message.extend_from_slice(EARLY_DATA_DOMAIN);
    message.extend_from_slice(data);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Ed25519Identity;

    fn test_identity() -> Ed25519Identity {
        Ed25519Identity::generate(&mut rand_core::OsRng)
    }

    #[tokio::test]
    async fn build_then_verify() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];

        let bytes = build(&identity, &noise_static, None).await.unwrap();
        let remote = verify(&bytes, &noise_static, None).unwrap();
        assert_eq!(remote.public_key, identity.public_key());
        assert_eq!(remote.peer_id, identity.peer_id());
        assert!(remote.early_data.is_none());
    }

    #[tokio::test]
    async fn verify_against_expected_peer() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];
        let bytes = build(&identity, &noise_static, None).await.unwrap();

        verify(&bytes, &noise_static, Some(&identity.peer_id())).unwrap();

        let stranger = test_identity();
        let result = verify(&bytes, &noise_static, Some(&stranger.peer_id()));
        assert!(matches!(result, Err(PayloadError::PeerIdMismatch)));
    }

    #[tokio::test]
    async fn signature_binds_the_static_key() {
        let identity = test_identity();
        let bytes = build(&identity, &[0x11u8; 32], None).await.unwrap();

        // The same payload presented for a different static key must fail.
        let result = verify(&bytes, &[0x22u8; 32], None);
        assert!(matches!(result, Err(PayloadError::StaticKeyNotAuthenticated)));
    }

    #[tokio::test]
    async fn foreign_signature_is_rejected() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];
        let bytes = build(&identity, &noise_static, None).await.unwrap();

        // Swap in a valid signature by the same key over different bytes.
        let mut payload = HandshakePayload::decode(bytes.as_slice()).unwrap();
        payload.identity_sig = identity.sign(b"something else").await.unwrap();
        let result = verify(&payload.encode_to_vec(), &noise_static, None);
        assert!(matches!(result, Err(PayloadError::StaticKeyNotAuthenticated)));
    }

    #[tokio::test]
    async fn early_data_round_trip() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];
        let bytes = build(&identity, &noise_static, Some(b"hello early"))
            .await
            .unwrap();

        let remote = verify(&bytes, &noise_static, None).unwrap();
        assert_eq!(remote.early_data.as_deref(), Some(&b"hello early"[..]));
    }

    #[tokio::test]
    async fn tampered_early_data_is_rejected() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];
        let bytes = build(&identity, &noise_static, Some(b"hello early"))
            .await
            .unwrap();

        let mut payload = HandshakePayload::decode(bytes.as_slice()).unwrap();
        payload.early_data = Some(b"hello evil!".to_vec());
        let result = verify(&payload.encode_to_vec(), &noise_static, None);
        assert!(matches!(result, Err(PayloadError::EarlyDataNotAuthenticated)));
    }

    #[tokio::test]
    async fn unsigned_early_data_is_ignored() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];
        let bytes = build(&identity, &noise_static, None).await.unwrap();

        let mut payload = HandshakePayload::decode(bytes.as_slice()).unwrap();
        payload.early_data = Some(b"unauthenticated".to_vec());
        let remote = verify(&payload.encode_to_vec(), &noise_static, None).unwrap();
        assert!(remote.early_data.is_none());
    }

    #[tokio::test]
    async fn decode_skips_unknown_tags() {
        let identity = test_identity();
        let noise_static = [0x11u8; 32];
        let mut bytes = build(&identity, &noise_static, None).await.unwrap();

        // Append a field with tag 5 (wire type 2, three payload bytes).
        bytes.extend_from_slice(&[0x2A, 0x03, 1, 2, 3]);
        verify(&bytes, &noise_static, None).unwrap();
    }

    #[test]
    fn missing_required_fields_fail_decode() {
        let empty = HandshakePayload::default().encode_to_vec();
        let result = verify(&empty, &[0u8; 32], None);
        assert!(matches!(result, Err(PayloadError::Decode)));
    }

    #[tokio::test]
    async fn codec_round_trip_is_stable() {
        let identity = test_identity();
        let bytes = build(&identity, &[0x11u8; 32], Some(b"data")).await.unwrap();
        let decoded = HandshakePayload::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.encode_to_vec(), bytes);
    }
}
