use rand_core::{CryptoRngCore, OsRng};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::aead::TAG_LEN;
use crate::crypto::hash::HASH_LEN;
use crate::crypto::x25519::{self, DH_LEN};
use crate::error::Error;
use crate::keys::{KeyPair, StaticSecret};
use crate::symmetric_state::{PROTOCOL_NAME, SymmetricState};
use crate::transport::TransportState;

/// The current action the caller must take to advance the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeAction {
    /// Call `write_message()` to produce the next handshake message.
    WriteMessage,
    /// Call `read_message()` with the peer's handshake message.
    ReadMessage,
    /// The handshake is complete. Call `into_transport()`.
    Complete,
    /// A previous step failed; the state machine is spent and its key
    /// material has been destroyed.
    Failed,
}

/// Internal state tracking which XX message this side processes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    InitiatorWriteMsg1,
    InitiatorReadMsg2,
    InitiatorWriteMsg3,
    ResponderReadMsg1,
    ResponderWriteMsg2,
    ResponderReadMsg3,
    Complete,
    Failed,
}

/// A Noise XX handshake state machine.
///
/// Implements the fixed ciphersuite `Noise_XX_25519_ChaChaPoly_SHA256`.
///
/// ## XX Pattern
///
/// ```text
/// XX:
///   -> e
///   <- e, ee, s, es
///   -> s, se
/// ```
///
/// Neither side knows the other's static key in advance; both statics
/// travel encrypted inside the handshake, and the payloads of messages 2
/// and 3 are where a higher layer proves ownership of a long-term
/// identity.
///
/// The state machine is single-use. Any processing error (truncated
/// message, AEAD failure, low-order peer key) moves it to a terminal
/// `Failed` phase and destroys the symmetric state and the ephemeral
/// secret. Calling a step out of turn returns [`Error::StateMisuse`]
/// without consuming the state.
pub struct Handshake {
    /// `Option` so that `into_transport()` can `.take()` it; also dropped
    /// eagerly (zeroizing ck, h and the cipher key) on failure.
    symmetric: Option<SymmetricState>,
    phase: Phase,
    is_initiator: bool,
    s: StaticSecret,
    s_pub: [u8; DH_LEN],
    e: Option<StaticSecret>,
    re: Option<[u8; DH_LEN]>,
    rs: Option<[u8; DH_LEN]>,
}

impl Drop for Handshake {
    fn drop(&mut self) {
        self.s_pub.zeroize();
        if let Some(ref mut v) = self.re {
            v.zeroize();
        }
        if let Some(ref mut v) = self.rs {
            v.zeroize();
        }
    }
}

impl Handshake {
    /// Create an initiator handshake.
    ///
    /// The `prologue` is mixed into the handshake hash but never sent;
    /// both sides must supply identical prologue bytes or the first
    /// decryption will fail.
    pub fn new_initiator(local: &KeyPair, prologue: &[u8]) -> Self {
        Self::new(local, prologue, true)
    }

    /// Create a responder handshake.
    pub fn new_responder(local: &KeyPair, prologue: &[u8]) -> Self {
        Self::new(local, prologue, false)
    }

    fn new(local: &KeyPair, prologue: &[u8], is_initiator: bool) -> Self {
        let mut symmetric = SymmetricState::initialize(PROTOCOL_NAME);

        // Prologue is mixed before any message (Noise spec Section 5.3).
        // XX has no pre-messages, so no static keys are mixed here.
        symmetric.mix_hash(prologue);

        Self {
            symmetric: Some(symmetric),
            phase: if is_initiator {
                Phase::InitiatorWriteMsg1
            } else {
                Phase::ResponderReadMsg1
            },
            is_initiator,
            // The caller retains the static key pair for reuse across
            // handshakes; both copies zeroize on drop.
            s: local.secret.clone(),
            s_pub: *local.public.as_bytes(),
            e: None,
            re: None,
            rs: None,
        }
    }

    fn ss(&mut self) -> Result<&mut SymmetricState, Error> {
        self.symmetric.as_mut().ok_or(Error::StateMisuse)
    }

    /// Terminal failure: destroy the symmetric state and ephemeral secret.
    fn fail(&mut self) {
        self.symmetric = None;
        self.e = None;
        self.phase = Phase::Failed;
    }

    /// Abandon the handshake, destroying all key material immediately
    /// rather than on drop. Every subsequent step reports
    /// [`Error::StateMisuse`].
    pub fn abort(&mut self) {
        self.fail();
    }

    /// What action the caller should take next.
    pub fn next_action(&self) -> HandshakeAction {
        match self.phase {
            Phase::InitiatorWriteMsg1 | Phase::InitiatorWriteMsg3 | Phase::ResponderWriteMsg2 => {
                HandshakeAction::WriteMessage
            }
            Phase::InitiatorReadMsg2 | Phase::ResponderReadMsg1 | Phase::ResponderReadMsg3 => {
                HandshakeAction::ReadMessage
            }
            Phase::Complete => HandshakeAction::Complete,
            Phase::Failed => HandshakeAction::Failed,
        }
    }

    /// Write the next handshake message.
    ///
    /// `payload` is application data encrypted within the message (in
    /// message 1 it travels in the clear, as no key exists yet).
    pub fn write_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        self.write_message_with_rng(payload, &mut OsRng)
    }

    /// Write the next handshake message with a specific RNG (useful for
    /// deterministic tests).
    pub fn write_message_with_rng(
        &mut self,
        payload: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<u8>, Error> {
        let result = match self.phase {
            Phase::InitiatorWriteMsg1 => self.write_msg1(payload, rng),
            Phase::ResponderWriteMsg2 => self.write_msg2(payload, rng),
            Phase::InitiatorWriteMsg3 => self.write_msg3(payload),
            _ => return Err(Error::StateMisuse),
        };
        if result.is_err() {
            self.fail();
        }
        result
    }

    /// Read a handshake message from the peer, returning the decrypted
    /// payload it carried.
    pub fn read_message(&mut self, message: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        let result = match self.phase {
            Phase::ResponderReadMsg1 => self.read_msg1(message),
            Phase::InitiatorReadMsg2 => self.read_msg2(message),
            Phase::ResponderReadMsg3 => self.read_msg3(message),
            _ => return Err(Error::StateMisuse),
        };
        if result.is_err() {
            self.fail();
        }
        result
    }

    /// The remote peer's static public key, once learned (message 2 for
    /// the initiator, message 3 for the responder).
    ///
    /// Callers must authenticate this key against the peer's identity
    /// before trusting the session.
    pub fn remote_static_public(&self) -> Option<[u8; DH_LEN]> {
        self.rs
    }

    /// The current handshake hash, committing to the whole transcript.
    pub fn handshake_hash(&self) -> Result<&[u8; HASH_LEN], Error> {
        self.symmetric
            .as_ref()
            .map(|s| s.handshake_hash())
            .ok_or(Error::StateMisuse)
    }

    /// Whether this side is the initiator.
    pub fn is_initiator(&self) -> bool {
        self.is_initiator
    }

    /// Convert the completed handshake into a transport state.
    ///
    /// Per Noise spec: the initiator sends with c1 and receives with c2,
    /// the responder the other way around.
    pub fn into_transport(mut self) -> Result<TransportState, Error> {
        if self.phase != Phase::Complete {
            return Err(Error::StateMisuse);
        }

        let is_initiator = self.is_initiator;
        let symmetric = self.symmetric.take().ok_or(Error::StateMisuse)?;
        let (h, c1, c2) = symmetric.split();
        Ok(TransportState::new(h, c1, c2, is_initiator))
    }

    // ===== Message 1: initiator writes -> e =====
    //
    // Layout: [e_pub(32)][payload(N)]. The payload is unencrypted since
    // no key has been mixed yet.

    fn write_msg1(
        &mut self,
        payload: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(DH_LEN + payload.len());

        // -> e
        let e = KeyPair::generate(rng);
        out.extend_from_slice(e.public.as_bytes());
        self.ss()?.mix_hash(e.public.as_bytes());
        self.e = Some(e.secret);

        // Keyless EncryptAndHash: the payload passes through unchanged
        // but still enters the transcript.
        let ciphertext = self.ss()?.encrypt_and_hash(payload)?;
        out.extend_from_slice(&ciphertext);

        self.phase = Phase::InitiatorReadMsg2;
        Ok(out)
    }

    // ===== Message 1: responder reads -> e =====

    fn read_msg1(&mut self, message: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        if message.len() < DH_LEN {
            return Err(Error::MalformedMessage);
        }

        // -> e
        let mut re = [0u8; DH_LEN];
        re.copy_from_slice(&message[..DH_LEN]);
        self.ss()?.mix_hash(&re);
        self.re = Some(re);

        let payload = self.ss()?.decrypt_and_hash(&message[DH_LEN..])?;

        self.phase = Phase::ResponderWriteMsg2;
        Ok(payload)
    }

    // ===== Message 2: responder writes <- e, ee, s, es =====
    //
    // Layout: [e_pub(32)][encrypted_s_pub(32+16)][encrypted_payload(N+16)]

    fn write_msg2(
        &mut self,
        payload: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(DH_LEN + DH_LEN + TAG_LEN + payload.len() + TAG_LEN);

        // <- e
        let e = KeyPair::generate(rng);
        out.extend_from_slice(e.public.as_bytes());
        self.ss()?.mix_hash(e.public.as_bytes());

        // <- ee: DH(e, re)
        let re = self.re.ok_or(Error::StateMisuse)?;
        let shared_ee = x25519::dh(&e.secret, &re)?;
        self.ss()?.mix_key(&*shared_ee);
        self.e = Some(e.secret);

        // <- s
        let s_pub = self.s_pub;
        let encrypted_s = self.ss()?.encrypt_and_hash(&s_pub)?;
        out.extend_from_slice(&encrypted_s);

        // <- es: DH(s, re)
        let shared_es = x25519::dh(&self.s, &re)?;
        self.ss()?.mix_key(&*shared_es);

        let encrypted_payload = self.ss()?.encrypt_and_hash(payload)?;
        out.extend_from_slice(&encrypted_payload);

        self.phase = Phase::ResponderReadMsg3;
        Ok(out)
    }

    // ===== Message 2: initiator reads <- e, ee, s, es =====

    fn read_msg2(&mut self, message: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        const ENCRYPTED_S_LEN: usize = DH_LEN + TAG_LEN;
        if message.len() < DH_LEN + ENCRYPTED_S_LEN + TAG_LEN {
            return Err(Error::MalformedMessage);
        }

        // <- e
        let mut re = [0u8; DH_LEN];
        re.copy_from_slice(&message[..DH_LEN]);
        self.ss()?.mix_hash(&re);
        self.re = Some(re);

        // <- ee: DH(e, re)
        let e = self.e.as_ref().ok_or(Error::StateMisuse)?;
        let shared_ee = x25519::dh(e, &re)?;
        self.ss()?.mix_key(&*shared_ee);

        // <- s
        let rs_plain = self
            .ss()?
            .decrypt_and_hash(&message[DH_LEN..DH_LEN + ENCRYPTED_S_LEN])?;
        let rs: [u8; DH_LEN] = rs_plain[..]
            .try_into()
            .map_err(|_| Error::MalformedMessage)?;
        self.rs = Some(rs);

        // <- es: DH(e, rs)
        let e = self.e.as_ref().ok_or(Error::StateMisuse)?;
        let shared_es = x25519::dh(e, &rs)?;
        self.ss()?.mix_key(&*shared_es);

        let payload = self
            .ss()?
            .decrypt_and_hash(&message[DH_LEN + ENCRYPTED_S_LEN..])?;

        self.phase = Phase::InitiatorWriteMsg3;
        Ok(payload)
    }

    // ===== Message 3: initiator writes -> s, se =====
    //
    // Layout: [encrypted_s_pub(32+16)][encrypted_payload(N+16)]

    fn write_msg3(&mut self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(DH_LEN + TAG_LEN + payload.len() + TAG_LEN);

        // -> s
        let s_pub = self.s_pub;
        let encrypted_s = self.ss()?.encrypt_and_hash(&s_pub)?;
        out.extend_from_slice(&encrypted_s);

        // -> se: DH(s, re)
        let re = self.re.ok_or(Error::StateMisuse)?;
        let shared_se = x25519::dh(&self.s, &re)?;
        self.ss()?.mix_key(&*shared_se);

        let encrypted_payload = self.ss()?.encrypt_and_hash(payload)?;
        out.extend_from_slice(&encrypted_payload);

        self.phase = Phase::Complete;
        Ok(out)
    }

    // ===== Message 3: responder reads -> s, se =====

    fn read_msg3(&mut self, message: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        const ENCRYPTED_S_LEN: usize = DH_LEN + TAG_LEN;
        if message.len() < ENCRYPTED_S_LEN + TAG_LEN {
            return Err(Error::MalformedMessage);
        }

        // -> s
        let rs_plain = self.ss()?.decrypt_and_hash(&message[..ENCRYPTED_S_LEN])?;
        let rs: [u8; DH_LEN] = rs_plain[..]
            .try_into()
            .map_err(|_| Error::MalformedMessage)?;
        self.rs = Some(rs);

        // -> se: DH(e, rs)
        let e = self.e.as_ref().ok_or(Error::StateMisuse)?;
        let shared_se = x25519::dh(e, &rs)?;
        self.ss()?.mix_key(&*shared_se);

        let payload = self.ss()?.decrypt_and_hash(&message[ENCRYPTED_S_LEN..])?;

        self.phase = Phase::Complete;
        Ok(payload)
    }
}
