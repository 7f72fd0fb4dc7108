//! X25519 key agreement.
//!
//! A thin layer over x25519-dalek that enforces the contributory-behavior
//! check of Noise spec Section 12.1: the all-zero DH output, produced
//! exactly by low-order peer keys, aborts the handshake.

use subtle::ConstantTimeEq;
use x25519_dalek::PublicKey as DalekPublicKey;
use zeroize::Zeroizing;

use crate::error::Error;
use crate::keys::StaticSecret;

/// DH output length in bytes (X25519 = 32).
pub const DH_LEN: usize = 32;

/// Run X25519 between a local secret and a remote public key.
///
/// Returns the 32-byte shared secret in a zeroizing buffer, or
/// `Error::InvalidPublicKey` if the output is all zeros. The zero check
/// runs in constant time, per RFC 7748 Section 6.1.
pub fn dh(
    local: &StaticSecret,
    remote: &[u8; DH_LEN],
) -> Result<Zeroizing<[u8; DH_LEN]>, Error> {
    let shared = Zeroizing::new(
        local
            .inner()
            .diffie_hellman(&DalekPublicKey::from(*remote))
            .to_bytes(),
    );

    let is_zero = shared[..].ct_eq(&[0u8; DH_LEN]);
    if bool::from(is_zero) {
        return Err(Error::InvalidPublicKey);
    }
    Ok(shared)
}
