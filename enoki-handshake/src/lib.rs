#![deny(unsafe_code)]

//! # enoki-handshake
//!
//! A pure, sans-IO implementation of the Noise XX handshake pattern
//! with a fixed ciphersuite: `Noise_XX_25519_ChaChaPoly_SHA256`.
//!
//! This crate is the cryptographic half of a libp2p-style secure channel:
//! the three XX messages, the symmetric-state machinery behind them, and
//! the transport cipher pair produced by `Split()`. Wire framing, the
//! libp2p identity payload and all I/O live one layer up (see the
//! `enoki-libp2p` crate).
//!
//! ## Security Properties
//!
//! - X25519 low-order point rejection (an all-zero DH output is fatal)
//! - All key material zeroized on drop, including on mid-handshake failure
//! - Handshake state is single-use: any failure is terminal
//! - Fixed ciphersuite (no algorithm negotiation)

pub mod crypto;
pub mod error;
pub mod keys;

mod cipher_state;
mod handshake;
mod symmetric_state;
mod transport;

// Re-export the primary public API
pub use error::Error;
pub use handshake::{Handshake, HandshakeAction};
pub use keys::{KeyPair, PublicKey, StaticSecret};
pub use transport::TransportState;

/// The Noise protocol name for the fixed ciphersuite.
pub const PROTOCOL_NAME: &str = symmetric_state::PROTOCOL_NAME;
