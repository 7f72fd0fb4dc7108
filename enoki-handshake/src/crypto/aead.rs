use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use zeroize::{Zeroize, Zeroizing};

use crate::error::Error;

/// AEAD key length in bytes.
pub const KEY_LEN: usize = 32;
/// AEAD tag length in bytes.
pub const TAG_LEN: usize = 16;
/// AEAD nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with associated data, returning the ciphertext with
/// the 16-byte tag appended.
pub fn encrypt(
    key: &[u8; KEY_LEN],
    nonce: u64,
    ad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let cipher = ChaCha20Poly1305::new(key.into());
    cipher
        .encrypt(
            &Nonce::from(nonce_bytes(nonce)),
            Payload {
                msg: plaintext,
                aad: ad,
            },
        )
        .map_err(|_| Error::MalformedMessage)
}

/// Decrypt `ciphertext` (body + 16-byte tag), verifying the tag against
/// the associated data.
///
/// The plaintext is returned zeroizing: handshake payloads carry key
/// signatures that must not linger in freed memory.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    nonce: u64,
    ad: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, Error> {
    if ciphertext.len() < TAG_LEN {
        return Err(Error::MalformedMessage);
    }

    let cipher = ChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(
            &Nonce::from(nonce_bytes(nonce)),
            Payload {
                msg: ciphertext,
                aad: ad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| Error::AeadAuthFailure)
}

/// Build the 12-byte nonce from a u64 counter.
///
/// 4 bytes of zeros followed by the 64-bit little-endian counter, per
/// Noise spec Section 5.1 for ChaChaPoly.
fn nonce_bytes(n: u64) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[4..].copy_from_slice(&n.to_le_bytes());
    nonce
}

/// Rekey function per Noise spec Section 11.3.
///
/// `REKEY(k) = ENCRYPT(k, maxnonce, "", zeros)` where maxnonce = 2^64 - 1
/// and zeros is 32 zero bytes. The first 32 output bytes become the new key.
pub fn rekey(key: &[u8; KEY_LEN]) -> Result<[u8; KEY_LEN], Error> {
    let mut output = encrypt(key, u64::MAX, &[], &[0u8; KEY_LEN])?;
    let mut new_key = [0u8; KEY_LEN];
    new_key.copy_from_slice(&output[..KEY_LEN]);
    output.zeroize();
    Ok(new_key)
}
