use enoki_handshake::KeyPair;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Error;
use crate::identity::PeerIdentity;
use crate::peer_id::PeerId;
use crate::xx::XXHandshake;

/// Everything a handshake needs besides the socket and the role.
///
/// The identity provider is borrowed for the duration of the builder
/// only: the signed payload is produced once when the configuration is
/// turned into a handshake, after which the provider is no longer
/// touched.
pub struct NoiseConfig<'a, I> {
    pub(crate) identity: &'a I,
    pub(crate) keypair: KeyPair,
    pub(crate) prologue: Vec<u8>,
    pub(crate) early_data: Option<Vec<u8>>,
    pub(crate) expected_peer: Option<PeerId>,
}

impl<'a, I: PeerIdentity> NoiseConfig<'a, I> {
    /// A configuration with an empty prologue and no expectations about
    /// the remote peer.
    pub fn new(identity: &'a I, keypair: KeyPair) -> Self {
        Self {
            identity,
            keypair,
            prologue: Vec::new(),
            early_data: None,
            expected_peer: None,
        }
    }

    /// Bytes mixed into the transcript before message 1.
    ///
    /// Both sides must supply identical prologue bytes or the handshake
    /// fails at the first decryption. Used to bind outer-protocol context
    /// (for example the negotiated protocol string) to this session.
    pub fn with_prologue(mut self, prologue: impl Into<Vec<u8>>) -> Self {
        self.prologue = prologue.into();
        self
    }

    /// Application data to authenticate inside our handshake payload,
    /// delivered to the remote before the transport is live.
    pub fn with_early_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.early_data = Some(data.into());
        self
    }

    /// Require the remote to prove this exact peer id.
    ///
    /// Dialers usually know who they expect on the other end; listeners
    /// usually leave this unset and read the authenticated id from the
    /// session afterwards.
    pub fn with_expected_peer(mut self, peer: PeerId) -> Self {
        self.expected_peer = Some(peer);
        self
    }

    /// Sign the local payload and take the initiator role on `socket`.
    pub async fn into_initiator<S>(self, socket: S) -> Result<XXHandshake<S>, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        XXHandshake::new(self, socket, true).await
    }

    /// Sign the local payload and take the responder role on `socket`.
    pub async fn into_responder<S>(self, socket: S) -> Result<XXHandshake<S>, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        XXHandshake::new(self, socket, false).await
    }
}
