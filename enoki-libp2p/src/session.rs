use enoki_handshake::TransportState;
use enoki_handshake::crypto::aead::TAG_LEN;
use tokio::io::{AsyncRead, AsyncWrite};
use zeroize::Zeroizing;

use crate::error::Error;
use crate::framing::{FramedTransport, MAX_FRAME_LEN};
use crate::identity::PublicKey;
use crate::payload::RemoteIdentity;
use crate::peer_id::PeerId;

/// Largest plaintext a single transport message can carry.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - TAG_LEN;

/// An established, mutually authenticated secure channel.
///
/// Produced by a successful handshake. Owns the socket and the pair of
/// transport ciphers; each direction advances its own nonce counter
/// independently, so sends and receives may be freely interleaved. The
/// session is not internally synchronised; callers must not issue
/// concurrent operations on the same direction.
pub struct NoiseSession<S> {
    framed: FramedTransport<S>,
    transport: TransportState,
    remote: RemoteIdentity,
    remote_static: [u8; 32],
}

impl<S> std::fmt::Debug for NoiseSession<S> {
    // Manual impl: avoids requiring `Debug` on `TransportState`, which
    // intentionally omits it to keep key material out of debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSession")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl<S> NoiseSession<S> {
    pub(crate) fn new(
        framed: FramedTransport<S>,
        transport: TransportState,
        remote: RemoteIdentity,
        remote_static: [u8; 32],
    ) -> Self {
        Self {
            framed,
            transport,
            remote,
            remote_static,
        }
    }

    /// Encrypt one message for the peer, advancing the send nonce.
    ///
    /// The ciphertext fits a single frame, so the plaintext is capped at
    /// [`MAX_PAYLOAD_LEN`].
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        if plaintext.len() > MAX_PAYLOAD_LEN {
            return Err(Error::MalformedFrame("plaintext exceeds 65519 bytes"));
        }
        Ok(self.transport.write_message(plaintext)?)
    }

    /// Decrypt one message from the peer, advancing the receive nonce.
    ///
    /// A failed authentication is fatal for the session.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        Ok(self.transport.read_message(ciphertext)?)
    }

    /// The authenticated peer id of the remote.
    pub fn remote_peer_id(&self) -> &PeerId {
        &self.remote.peer_id
    }

    /// The remote's long-term identity public key.
    pub fn remote_public_key(&self) -> &PublicKey {
        &self.remote.public_key
    }

    /// The remote's Noise static key, as authenticated by its identity
    /// signature during the handshake.
    pub fn remote_static_key(&self) -> &[u8; 32] {
        &self.remote_static
    }

    /// Early data the remote sent inside its signed handshake payload,
    /// if any.
    pub fn remote_early_data(&self) -> Option<&[u8]> {
        self.remote.early_data.as_deref()
    }

    /// The final handshake hash, a channel-binding value identical on
    /// both sides of this session.
    pub fn handshake_hash(&self) -> &[u8; 32] {
        self.transport.handshake_hash()
    }

    /// Messages encrypted so far in the sending direction.
    pub fn send_nonce(&self) -> u64 {
        self.transport.send_nonce()
    }

    /// Messages decrypted so far in the receiving direction.
    pub fn recv_nonce(&self) -> u64 {
        self.transport.recv_nonce()
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> NoiseSession<S> {
    /// Encrypt and send one framed message.
    pub async fn send(&mut self, plaintext: &[u8]) -> Result<(), Error> {
        let frame = self.encrypt(plaintext)?;
        self.framed.write_frame(&frame).await
    }

    /// Receive and decrypt one framed message.
    pub async fn recv(&mut self) -> Result<Zeroizing<Vec<u8>>, Error> {
        let frame = self.framed.read_frame().await?;
        self.decrypt(&frame)
    }
}
