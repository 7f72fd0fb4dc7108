use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Hash output length (SHA-256 = 32 bytes).
pub const HASH_LEN: usize = 32;

/// Compute SHA-256 of the input.
pub fn hash(input: &[u8]) -> [u8; HASH_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Compute SHA-256 of two concatenated inputs without allocating.
pub fn hash_two(a: &[u8], b: &[u8]) -> [u8; HASH_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(a);
    hasher.update(b);
    hasher.finalize().into()
}

/// `HKDF(chaining_key, input_key_material, 2)` per Noise spec Section 4.3.
///
/// Extract with the chaining key as salt, then expand 64 bytes with empty
/// info ([RFC 5869](https://datatracker.ietf.org/doc/html/rfc5869)); this
/// is identical to the Noise spec's HMAC chain with counter bytes.
pub fn hkdf2(
    chaining_key: &[u8; HASH_LEN],
    input_key_material: &[u8],
) -> (Zeroizing<[u8; HASH_LEN]>, Zeroizing<[u8; HASH_LEN]>) {
    let hk = Hkdf::<Sha256>::new(Some(chaining_key), input_key_material);
    let mut okm = Zeroizing::new([0u8; HASH_LEN * 2]);
    hk.expand(&[], &mut okm[..])
        .expect("two blocks is within the HKDF output limit");

    let mut output1 = Zeroizing::new([0u8; HASH_LEN]);
    let mut output2 = Zeroizing::new([0u8; HASH_LEN]);
    output1.copy_from_slice(&okm[..HASH_LEN]);
    output2.copy_from_slice(&okm[HASH_LEN..]);
    (output1, output2)
}

/// Three zeroized HKDF output blocks.
pub type HkdfOutput3 = (
    Zeroizing<[u8; HASH_LEN]>,
    Zeroizing<[u8; HASH_LEN]>,
    Zeroizing<[u8; HASH_LEN]>,
);

/// `HKDF(chaining_key, input_key_material, 3)`, used by `MixKeyAndHash`.
pub fn hkdf3(chaining_key: &[u8; HASH_LEN], input_key_material: &[u8]) -> HkdfOutput3 {
    let hk = Hkdf::<Sha256>::new(Some(chaining_key), input_key_material);
    let mut okm = Zeroizing::new([0u8; HASH_LEN * 3]);
    hk.expand(&[], &mut okm[..])
        .expect("three blocks is within the HKDF output limit");

    let mut output1 = Zeroizing::new([0u8; HASH_LEN]);
    let mut output2 = Zeroizing::new([0u8; HASH_LEN]);
    let mut output3 = Zeroizing::new([0u8; HASH_LEN]);
    output1.copy_from_slice(&okm[..HASH_LEN]);
    output2.copy_from_slice(&okm[HASH_LEN..HASH_LEN * 2]);
    output3.copy_from_slice(&okm[HASH_LEN * 2..]);
    (output1, output2, output3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_deterministic() {
        assert_eq!(hash(b"hello"), hash(b"hello"));
    }

    #[test]
    fn hash_different_inputs() {
        assert_ne!(hash(b"hello"), hash(b"world"));
    }

    #[test]
    fn hash_two_equals_concatenated_hash() {
        let a = b"hello";
        let b = b"world";
        let mut combined = Vec::new();
        combined.extend_from_slice(a);
        combined.extend_from_slice(b);
        assert_eq!(hash_two(a, b), hash(&combined));
    }

    #[test]
    fn sha256_known_answer() {
        // SHA-256("abc"), FIPS 180-2 appendix B.1
        let expected = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(hash(b"abc"), expected);
    }

    #[test]
    fn hkdf2_produces_different_outputs() {
        let ck = [0x01u8; HASH_LEN];
        let (o1, o2) = hkdf2(&ck, b"ikm");
        assert_ne!(*o1, *o2);
    }

    #[test]
    fn hkdf2_depends_on_salt_and_ikm() {
        let (a, _) = hkdf2(&[0x01u8; HASH_LEN], b"ikm");
        let (b, _) = hkdf2(&[0x02u8; HASH_LEN], b"ikm");
        let (c, _) = hkdf2(&[0x01u8; HASH_LEN], b"other");
        assert_ne!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn hkdf3_extends_hkdf2() {
        // The first two blocks of the 3-output expansion must equal the
        // 2-output expansion for the same inputs.
        let ck = [0x07u8; HASH_LEN];
        let (a1, a2) = hkdf2(&ck, b"shared secret");
        let (b1, b2, b3) = hkdf3(&ck, b"shared secret");
        assert_eq!(*a1, *b1);
        assert_eq!(*a2, *b2);
        assert_ne!(*b2, *b3);
    }
}
