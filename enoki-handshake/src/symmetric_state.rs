use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::cipher_state::CipherState;
use crate::crypto::aead::KEY_LEN;
use crate::crypto::hash::{self, HASH_LEN};
use crate::error::Error;

/// The full Noise protocol name of the fixed ciphersuite.
///
/// Exactly 32 ASCII bytes, so `InitializeSymmetric` copies it into `h`
/// verbatim with no padding and no hashing.
pub const PROTOCOL_NAME: &str = "Noise_XX_25519_ChaChaPoly_SHA256";

/// Noise SymmetricState — the chaining key and handshake hash.
///
/// Per Noise spec Section 5.2. The chaining key `ck` absorbs every DH
/// output of the handshake; the hash `h` commits to every wire byte in
/// transcript order and serves as the AEAD associated data.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricState {
    cipher: CipherState,
    ck: Zeroizing<[u8; HASH_LEN]>,
    h: [u8; HASH_LEN],
}

impl SymmetricState {
    /// `InitializeSymmetric(protocol_name)`.
    ///
    /// Names up to 32 bytes are right-zero-padded into `h`; longer names
    /// are hashed. `ck` starts equal to `h` and the cipher starts keyless.
    pub fn initialize(protocol_name: &str) -> Self {
        let name = protocol_name.as_bytes();
        let h = if name.len() <= HASH_LEN {
            let mut h = [0u8; HASH_LEN];
            h[..name.len()].copy_from_slice(name);
            h
        } else {
            hash::hash(name)
        };

        Self {
            cipher: CipherState::empty(),
            ck: Zeroizing::new(h),
            h,
        }
    }

    /// `h = HASH(h || data)`.
    pub fn mix_hash(&mut self, data: &[u8]) {
        self.h = hash::hash_two(&self.h, data);
    }

    /// `(ck, temp_k) = HKDF(ck, input_key_material, 2)`, then key the
    /// cipher with `temp_k`, resetting its nonce.
    pub fn mix_key(&mut self, input_key_material: &[u8]) {
        let (new_ck, temp_k) = hash::hkdf2(&self.ck, input_key_material);
        *self.ck = *new_ck;

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&*temp_k);
        self.cipher.initialize_key(key);
        key.zeroize();
    }

    /// `MixKeyAndHash(input_key_material)` per Noise spec Section 5.2.
    ///
    /// The PSK path: a 3-output HKDF updates `ck`, folds the middle block
    /// into `h`, and rekeys the cipher. The XX pattern never executes it.
    #[allow(dead_code)]
    pub fn mix_key_and_hash(&mut self, input_key_material: &[u8]) {
        let (new_ck, temp_h, temp_k) = hash::hkdf3(&self.ck, input_key_material);
        *self.ck = *new_ck;
        self.mix_hash(&*temp_h);

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&*temp_k);
        self.cipher.initialize_key(key);
        key.zeroize();
    }

    /// `EncryptAndHash(plaintext)`: encrypt with `h` as associated data,
    /// then mix the ciphertext into `h`.
    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let ciphertext = self.cipher.encrypt_with_ad(&self.h, plaintext)?;
        self.mix_hash(&ciphertext);
        Ok(ciphertext)
    }

    /// `DecryptAndHash(ciphertext)`: decrypt with the *current* `h` as
    /// associated data, then mix the ciphertext into `h`.
    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        let plaintext = self.cipher.decrypt_with_ad(&self.h, ciphertext)?;
        self.mix_hash(ciphertext);
        Ok(plaintext)
    }

    /// `Split()`: derive the two transport CipherStates.
    ///
    /// `(temp_k1, temp_k2) = HKDF(ck, "", 2)`; the final handshake hash is
    /// returned alongside them as the channel-binding value.
    pub fn split(self) -> ([u8; HASH_LEN], CipherState, CipherState) {
        let (temp_k1, temp_k2) = hash::hkdf2(&self.ck, &[]);

        let mut c1 = CipherState::empty();
        let mut key1 = [0u8; KEY_LEN];
        key1.copy_from_slice(&*temp_k1);
        c1.initialize_key(key1);
        key1.zeroize();

        let mut c2 = CipherState::empty();
        let mut key2 = [0u8; KEY_LEN];
        key2.copy_from_slice(&*temp_k2);
        c2.initialize_key(key2);
        key2.zeroize();

        (self.h, c1, c2)
    }

    /// The current handshake hash.
    pub fn handshake_hash(&self) -> &[u8; HASH_LEN] {
        &self.h
    }

    /// Whether the inner cipher has been keyed yet.
    #[allow(dead_code)]
    pub fn has_key(&self) -> bool {
        self.cipher.has_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_copies_exact_length_protocol_name() {
        // PROTOCOL_NAME fills h exactly; no padding, no hashing.
        assert_eq!(PROTOCOL_NAME.len(), HASH_LEN);
        let ss = SymmetricState::initialize(PROTOCOL_NAME);
        assert_eq!(&ss.handshake_hash()[..], PROTOCOL_NAME.as_bytes());
    }

    #[test]
    fn initialize_pads_short_protocol_name() {
        let ss = SymmetricState::initialize("Noise_N_25519_ChaChaPoly_SHA256");
        let mut expected = [0u8; HASH_LEN];
        expected[..31].copy_from_slice(b"Noise_N_25519_ChaChaPoly_SHA256");
        assert_eq!(*ss.handshake_hash(), expected);
    }

    #[test]
    fn initialize_hashes_long_protocol_name() {
        let name = "Noise_XXfallback_25519_ChaChaPoly_SHA256";
        let ss = SymmetricState::initialize(name);
        assert_eq!(*ss.handshake_hash(), hash::hash(name.as_bytes()));
    }

    #[test]
    fn both_sides_derive_identical_transport_keys() {
        let mut a = SymmetricState::initialize(PROTOCOL_NAME);
        let mut b = SymmetricState::initialize(PROTOCOL_NAME);
        a.mix_hash(b"prologue");
        b.mix_hash(b"prologue");
        a.mix_key(b"dh output");
        b.mix_key(b"dh output");

        let (h_a, mut a1, _a2) = a.split();
        let (h_b, _b1, mut b2) = b.split();
        assert_eq!(h_a, h_b);

        // c1 of one side decrypts what c1 of the other encrypts; pairing
        // c1 with c2 must fail.
        let ct = a1.encrypt_with_ad(b"", b"ping").unwrap();
        assert_eq!(
            b2.decrypt_with_ad(b"", &ct).unwrap_err(),
            Error::AeadAuthFailure
        );
    }

    #[test]
    fn encrypt_and_hash_round_trip() {
        let mut a = SymmetricState::initialize(PROTOCOL_NAME);
        let mut b = SymmetricState::initialize(PROTOCOL_NAME);
        a.mix_key(b"shared");
        b.mix_key(b"shared");

        let ciphertext = a.encrypt_and_hash(b"field").unwrap();
        let plaintext = b.decrypt_and_hash(&ciphertext).unwrap();
        assert_eq!(&plaintext[..], b"field");
        assert_eq!(a.handshake_hash(), b.handshake_hash());
    }

    #[test]
    fn mix_key_and_hash_diverges_from_mix_key() {
        let mut a = SymmetricState::initialize(PROTOCOL_NAME);
        let mut b = SymmetricState::initialize(PROTOCOL_NAME);
        a.mix_key(b"ikm");
        b.mix_key_and_hash(b"ikm");
        assert_ne!(a.handshake_hash(), b.handshake_hash());
    }
}
