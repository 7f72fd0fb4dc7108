use zeroize::{Zeroize, Zeroizing};

use crate::cipher_state::CipherState;
use crate::crypto::aead::TAG_LEN;
use crate::crypto::hash::HASH_LEN;
use crate::error::Error;

/// Post-handshake transport encryption state.
///
/// Holds the two `CipherState`s produced by `Split()`, one per direction.
/// The assignment depends on the role this side played:
/// - Initiator: c1 = send, c2 = recv
/// - Responder: c1 = recv, c2 = send
pub struct TransportState {
    send: CipherState,
    recv: CipherState,
    handshake_hash: [u8; HASH_LEN],
}

impl std::fmt::Debug for TransportState {
    // Manual impl: avoids requiring `Debug` on `CipherState`, which
    // intentionally omits it to keep key material out of debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportState").finish_non_exhaustive()
    }
}

impl Drop for TransportState {
    fn drop(&mut self) {
        self.handshake_hash.zeroize();
    }
}

impl TransportState {
    pub(crate) fn new(
        handshake_hash: [u8; HASH_LEN],
        c1: CipherState,
        c2: CipherState,
        is_initiator: bool,
    ) -> Self {
        if is_initiator {
            Self {
                send: c1,
                recv: c2,
                handshake_hash,
            }
        } else {
            Self {
                send: c2,
                recv: c1,
                handshake_hash,
            }
        }
    }

    /// Encrypt a payload for sending to the peer.
    ///
    /// Returns the ciphertext (payload + AEAD tag) and advances the send
    /// nonce.
    pub fn write_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        self.send.encrypt_with_ad(&[], payload)
    }

    /// Decrypt a message received from the peer.
    ///
    /// A failed decryption is fatal for the session; the receive nonce is
    /// only advanced on success.
    pub fn read_message(&mut self, message: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        self.recv.decrypt_with_ad(&[], message)
    }

    /// The final handshake hash — a channel binding value.
    ///
    /// Both sides hold the same value after a successful handshake and can
    /// use it to tie outer-protocol messages to this exact session.
    pub fn handshake_hash(&self) -> &[u8; HASH_LEN] {
        &self.handshake_hash
    }

    /// Number of messages encrypted so far in the sending direction.
    pub fn send_nonce(&self) -> u64 {
        self.send.nonce()
    }

    /// Number of messages decrypted so far in the receiving direction.
    pub fn recv_nonce(&self) -> u64 {
        self.recv.nonce()
    }

    /// The AEAD tag overhead per transport message.
    pub fn overhead(&self) -> usize {
        TAG_LEN
    }

    /// Rekey the sending cipher (Noise spec Section 11.3).
    pub fn rekey_send(&mut self) -> Result<(), Error> {
        self.send.rekey()
    }

    /// Rekey the receiving cipher (Noise spec Section 11.3).
    pub fn rekey_recv(&mut self) -> Result<(), Error> {
        self.recv.rekey()
    }
}
