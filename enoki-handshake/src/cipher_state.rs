use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::aead::{self, KEY_LEN, TAG_LEN};
use crate::error::Error;

/// Noise CipherState — an AEAD key plus its 64-bit nonce counter.
///
/// Per Noise spec Section 5.1. A `CipherState` without a key passes data
/// through unchanged; this is how the first XX message travels before any
/// DH output has been mixed in.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherState {
    /// The AEAD key, or `None` if uninitialized.
    key: Option<[u8; KEY_LEN]>,
    /// Nonce counter, incremented after each successful AEAD operation.
    #[zeroize(skip)]
    nonce: u64,
}

impl CipherState {
    /// Create an empty (uninitialized) CipherState.
    pub fn empty() -> Self {
        Self {
            key: None,
            nonce: 0,
        }
    }

    /// Install a key, resetting the nonce counter to zero.
    ///
    /// The previous key, if any, is overwritten and never used again.
    pub fn initialize_key(&mut self, key: [u8; KEY_LEN]) {
        self.key = Some(key);
        self.nonce = 0;
    }

    /// Whether this CipherState has a key set.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Number of messages processed under the current key.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Encrypt plaintext with associated data, appending the AEAD tag.
    ///
    /// If no key is set, returns the plaintext unchanged without touching
    /// the nonce (Noise spec behavior).
    pub fn encrypt_with_ad(&mut self, ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let Some(key) = &self.key else {
            return Ok(plaintext.to_vec());
        };
        if self.nonce == u64::MAX {
            // Nonce 2^64-1 is reserved for rekey (Noise spec §11.3)
            return Err(Error::NonceExhausted);
        }
        let ciphertext = aead::encrypt(key, self.nonce, ad, plaintext)?;
        self.nonce += 1;
        Ok(ciphertext)
    }

    /// Decrypt ciphertext with associated data, verifying the AEAD tag.
    ///
    /// A tag mismatch is fatal and non-recoverable for this CipherState:
    /// the nonce is not advanced and the caller must discard the session.
    pub fn decrypt_with_ad(
        &mut self,
        ad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        let Some(key) = &self.key else {
            return Ok(Zeroizing::new(ciphertext.to_vec()));
        };
        if self.nonce == u64::MAX {
            return Err(Error::NonceExhausted);
        }
        let plaintext = aead::decrypt(key, self.nonce, ad, ciphertext)?;
        self.nonce += 1;
        Ok(plaintext)
    }

    /// Rekey per Noise spec Section 11.3. Does not reset the nonce counter.
    pub fn rekey(&mut self) -> Result<(), Error> {
        if let Some(key) = &mut self.key {
            *key = aead::rekey(key)?;
        }
        Ok(())
    }

    /// The overhead added by encryption (0 if no key, the tag otherwise).
    #[allow(dead_code)]
    pub fn overhead(&self) -> usize {
        if self.has_key() { TAG_LEN } else { 0 }
    }
}
