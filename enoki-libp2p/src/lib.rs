#![deny(unsafe_code)]

//! # enoki-libp2p
//!
//! The libp2p secure channel built on the [`enoki-handshake`] Noise XX
//! core: it binds each peer's long-term libp2p identity to its ephemeral
//! Noise static key and produces an encrypted transport session.
//!
//! A handshake runs in three fixed steps over any reliable ordered byte
//! stream:
//!
//! ```text
//! initiator                                responder
//! ---------                                ---------
//! propose()   -- e ------------------->    propose()
//! exchange()  <- e, ee, s, es, payload --  exchange()
//! finish()    -- s, se, payload ------->   finish()
//! ```
//!
//! The payloads of messages 2 and 3 carry each side's marshalled identity
//! public key and a signature over its Noise static key, so by the time
//! [`XXHandshake::finish`] returns a [`NoiseSession`], both directions are
//! encrypted *and* both peers are authenticated.
//!
//! [`enoki-handshake`]: enoki_handshake

pub mod error;
pub mod framing;
pub mod identity;
pub mod payload;
pub mod peer_id;

mod config;
mod session;
mod xx;

pub use config::NoiseConfig;
pub use enoki_handshake::{KeyPair, PROTOCOL_NAME, StaticSecret};
pub use error::Error;
pub use identity::{Ed25519Identity, IdentityError, PeerIdentity, PublicKey};
pub use payload::RemoteIdentity;
pub use peer_id::PeerId;
pub use session::NoiseSession;
pub use xx::XXHandshake;

/// Name under which the secure channel is negotiated by
/// *multistream-select* before the first Noise byte is exchanged.
pub const PROTOCOL_ID: &str = "/noise";
