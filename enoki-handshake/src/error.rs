/// Errors that can occur inside the Noise handshake or transport ciphers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Poly1305 tag verification failed on an encrypted field or message.
    AeadAuthFailure,
    /// A peer public key is invalid: Diffie-Hellman with it produced the
    /// all-zero shared secret (low-order or identity point).
    InvalidPublicKey,
    /// A message is shorter than the fixed minimum for its handshake step,
    /// or an encrypted field has an impossible length.
    MalformedMessage,
    /// An operation was invoked out of order, or on a spent state machine.
    StateMisuse,
    /// The 64-bit nonce counter is exhausted (2^64 - 1 is reserved).
    NonceExhausted,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AeadAuthFailure => write!(f, "message authentication failed"),
            Self::InvalidPublicKey => write!(f, "invalid peer public key"),
            Self::MalformedMessage => write!(f, "malformed handshake message"),
            Self::StateMisuse => write!(f, "operation not valid in current state"),
            Self::NonceExhausted => write!(f, "nonce counter exhausted"),
        }
    }
}

impl core::error::Error for Error {}
