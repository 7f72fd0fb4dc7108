use std::io;

use thiserror::Error as ThisError;

use crate::identity::IdentityError;

/// Causes a signed handshake payload can fail verification with.
///
/// Every variant is rendered behind the stable prefix of
/// [`Error::SignedPayload`]; upstream code pattern-matches on the combined
/// message, so the wording here is frozen.
#[derive(Debug, ThisError)]
pub enum PayloadError {
    /// The payload bytes do not parse as the handshake payload record, or
    /// a required field is missing.
    #[error("Invalid payload.")]
    Decode,
    /// The identity key envelope carries an algorithm this implementation
    /// does not support.
    #[error("Unsupported libp2p public key algorithm.")]
    UnsupportedKeyType,
    /// The peer id derived from the identity key disagrees with the one
    /// the caller expected.
    #[error("Peer ID doesn't match libp2p public key.")]
    PeerIdMismatch,
    /// The signature over the Noise static key does not verify.
    #[error("Static key signature is invalid.")]
    StaticKeyNotAuthenticated,
    /// The signature over the early data does not verify.
    #[error("Early data signature is invalid.")]
    EarlyDataNotAuthenticated,
}

/// Errors terminating a libp2p Noise handshake or session.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Propagated verbatim from the underlying byte stream.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
    /// A frame is inconsistent with the 16-bit length framing.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),
    /// Failure inside the Noise state machines: AEAD authentication, DH
    /// validation, nonce exhaustion or message layout.
    #[error("noise protocol error: {0}")]
    Noise(#[from] enoki_handshake::Error),
    /// The remote's signed payload failed verification. The message
    /// prefix is stable and part of the public API.
    #[error("Error occurred while verifying signed payload: {0}")]
    SignedPayload(#[from] PayloadError),
    /// Signing our own payload failed; the handshake never left this side.
    #[error("identity signing failed: {0}")]
    Identity(#[from] IdentityError),
    /// A handshake step was invoked out of order.
    #[error("handshake step invoked out of order")]
    StateMisuse,
}
