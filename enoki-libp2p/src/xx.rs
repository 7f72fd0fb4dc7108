use enoki_handshake::Handshake;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use crate::config::NoiseConfig;
use crate::error::Error;
use crate::framing::FramedTransport;
use crate::identity::PeerIdentity;
use crate::payload::{self, RemoteIdentity};
use crate::peer_id::PeerId;
use crate::session::NoiseSession;

/// Which of the three fixed steps runs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Propose,
    Exchange,
    Finish,
    /// A step failed; the handshake is spent and must not touch the wire
    /// again.
    Failed,
}

/// One libp2p Noise XX handshake over a framed socket.
///
/// The three steps mirror the three wire messages and must be called in
/// order on both sides:
///
/// 1. [`propose`](Self::propose): the initiator sends message 1, the
///    responder reads it.
/// 2. [`exchange`](Self::exchange): the responder sends message 2, the
///    initiator reads it and authenticates the responder's identity.
/// 3. [`finish`](Self::finish): the initiator sends message 3, the
///    responder reads it and authenticates the initiator; both sides
///    split into the transport ciphers and obtain a [`NoiseSession`].
///
/// Out-of-order or repeated calls fail with [`Error::StateMisuse`]. A
/// step that fails for any other reason is terminal: key material is
/// zeroized on the spot and every later call reports
/// [`Error::StateMisuse`] rather than reading from the socket again.
/// Dropping the handshake at any point likewise zeroizes all key
/// material.
pub struct XXHandshake<S> {
    framed: FramedTransport<S>,
    state: Handshake,
    /// The signed local payload; contains a signature, so kept zeroizing.
    local_payload: Zeroizing<Vec<u8>>,
    expected_peer: Option<PeerId>,
    remote: Option<RemoteIdentity>,
    stage: Stage,
}

impl<S: AsyncRead + AsyncWrite + Unpin> XXHandshake<S> {
    pub(crate) async fn new<I: PeerIdentity>(
        config: NoiseConfig<'_, I>,
        socket: S,
        is_initiator: bool,
    ) -> Result<Self, Error> {
        let local_payload = payload::build(
            config.identity,
            config.keypair.public.as_bytes(),
            config.early_data.as_deref(),
        )
        .await?;

        let state = if is_initiator {
            Handshake::new_initiator(&config.keypair, &config.prologue)
        } else {
            Handshake::new_responder(&config.keypair, &config.prologue)
        };

        Ok(Self {
            framed: FramedTransport::new(socket),
            state,
            local_payload: Zeroizing::new(local_payload),
            expected_peer: config.expected_peer,
            remote: None,
            stage: Stage::Propose,
        })
    }

    /// Terminal failure: zeroize the core state and the signed payload
    /// now instead of waiting for drop.
    fn fail(&mut self) {
        self.state.abort();
        self.local_payload.zeroize();
        self.stage = Stage::Failed;
    }

    /// Step 1: the initiator sends its ephemeral key, the responder reads
    /// it. No authentication has happened yet.
    pub async fn propose(&mut self) -> Result<(), Error> {
        if self.stage != Stage::Propose {
            return Err(Error::StateMisuse);
        }
        match self.propose_inner().await {
            Ok(()) => {
                self.stage = Stage::Exchange;
                Ok(())
            }
            Err(err) => {
                self.fail();
                Err(err)
            }
        }
    }

    async fn propose_inner(&mut self) -> Result<(), Error> {
        if self.state.is_initiator() {
            let message = self.state.write_message(&[])?;
            self.framed.write_frame(&message).await?;
            trace!(len = message.len(), "sent noise handshake message 1");
        } else {
            let frame = self.framed.read_frame().await?;
            // Message 1 carries no key material beyond `e`; any payload
            // bytes are unauthenticated and ignored.
            let _ = self.state.read_message(&frame)?;
            trace!(len = frame.len(), "received noise handshake message 1");
        }
        Ok(())
    }

    /// Step 2: the responder sends its static key and signed payload, the
    /// initiator reads them and authenticates the responder.
    pub async fn exchange(&mut self) -> Result<(), Error> {
        if self.stage != Stage::Exchange {
            return Err(Error::StateMisuse);
        }
        match self.exchange_inner().await {
            Ok(()) => {
                self.stage = Stage::Finish;
                Ok(())
            }
            Err(err) => {
                self.fail();
                Err(err)
            }
        }
    }

    async fn exchange_inner(&mut self) -> Result<(), Error> {
        if self.state.is_initiator() {
            let frame = self.framed.read_frame().await?;
            let payload_bytes = self.state.read_message(&frame)?;
            let remote = self.verify_remote(&payload_bytes)?;
            debug!(peer = %remote.peer_id, "authenticated responder");
            self.remote = Some(remote);
        } else {
            let message = self.state.write_message(&self.local_payload)?;
            self.framed.write_frame(&message).await?;
            trace!(len = message.len(), "sent noise handshake message 2");
        }
        Ok(())
    }

    /// Step 3: the initiator sends its static key and signed payload, the
    /// responder reads them and authenticates the initiator. Both sides
    /// derive the transport ciphers.
    ///
    /// Consumes the handshake; the returned session owns the socket. A
    /// failure here is terminal by construction: the consumed state is
    /// dropped and zeroized on the error path.
    pub async fn finish(mut self) -> Result<NoiseSession<S>, Error> {
        if self.stage != Stage::Finish {
            return Err(Error::StateMisuse);
        }

        if self.state.is_initiator() {
            let message = self.state.write_message(&self.local_payload)?;
            self.framed.write_frame(&message).await?;
            trace!(len = message.len(), "sent noise handshake message 3");
        } else {
            let frame = self.framed.read_frame().await?;
            let payload_bytes = self.state.read_message(&frame)?;
            let remote = self.verify_remote(&payload_bytes)?;
            debug!(peer = %remote.peer_id, "authenticated initiator");
            self.remote = Some(remote);
        }

        let remote = self.remote.take().ok_or(Error::StateMisuse)?;
        let remote_static = self
            .state
            .remote_static_public()
            .ok_or(Error::StateMisuse)?;
        let transport = self.state.into_transport()?;
        debug!(peer = %remote.peer_id, "noise handshake complete");

        Ok(NoiseSession::new(
            self.framed,
            transport,
            remote,
            remote_static,
        ))
    }

    /// Verify a received payload against the static key just learned.
    fn verify_remote(&self, payload_bytes: &[u8]) -> Result<RemoteIdentity, Error> {
        let remote_static = self
            .state
            .remote_static_public()
            .ok_or(Error::StateMisuse)?;
        let remote = payload::verify(payload_bytes, &remote_static, self.expected_peer.as_ref())?;
        Ok(remote)
    }
}
