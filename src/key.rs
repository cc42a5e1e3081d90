//! Secret-derived keying material.
//!
//! Everything the codec needs from a caller's secret byte string is produced here: the PRNG
//! seed, the public key hint committed inside every payload, and the AEAD cipher key.
//!
//! The cipher key must be a pure function of the caller's secret rather than a fresh random
//! value minted once per process — otherwise a watermark embedded by one process could never be
//! verified by another, or after a restart. Here the cipher key is `HKDF-SHA256(secret)`,
//! recomputed identically at embed and extract time.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};

use crate::error::WatermarkError;

/// Length in bytes of the AEAD cipher key derived for each secret.
pub const CIPHER_KEY_LEN: usize = 32;

/// Number of leading hex characters of `SHA256(secret)` committed as the key hint.
pub const KEY_HINT_LEN: usize = 16;

const HKDF_SALT: &[u8] = b"keymark-watermark-cipher-salt-v1";
const HKDF_INFO: &[u8] = b"keymark-aead-key-v1";

/// Keying material derived once per operation from the caller's secret.
#[derive(Clone)]
pub struct DerivedKey {
    /// 32-bit seed for [`Prng`](crate::prng::Prng).
    pub seed: u32,
    /// 16-hex-char prefix of `SHA256(secret)`, committed inside every [`SignatureRecord`](crate::record::SignatureRecord).
    pub key_hint: String,
    pub(crate) cipher_key: [u8; CIPHER_KEY_LEN],
}

/// Derives [`DerivedKey`] from a caller-supplied secret.
pub struct KeyDeriver;

impl KeyDeriver {
    /// `h = SHA256(secret)`; `seed = u32::from_be_bytes(h[0..4])`; `hint = hex(h)[0..16]`.
    /// The cipher key is a separate HKDF expansion over the same secret, never embedded.
    pub fn derive(secret: &[u8]) -> DerivedKey {
        let digest = Sha256::digest(secret);
        let seed = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        let key_hint = hex::encode(digest)[..KEY_HINT_LEN].to_string();
        let cipher_key = Self::derive_cipher_key(secret);
        DerivedKey {
            seed,
            key_hint,
            cipher_key,
        }
    }

    /// `SHA256(secret)[0..16]` hex, without deriving the PRNG seed or cipher key. Used by
    /// [`WatermarkProcessor::verify_key`](crate::WatermarkProcessor::verify_key), which only
    /// needs to compare key hints.
    pub fn key_hash(secret: &[u8]) -> String {
        hex::encode(Sha256::digest(secret))[..KEY_HINT_LEN].to_string()
    }

    fn derive_cipher_key(secret: &[u8]) -> [u8; CIPHER_KEY_LEN] {
        let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret);
        let mut okm = [0u8; CIPHER_KEY_LEN];
        hk.expand(HKDF_INFO, &mut okm)
            .expect("CIPHER_KEY_LEN is a valid HKDF-SHA256 output length");
        okm
    }
}

/// Truncates `SHA256(data)` to its first four bytes, interpreted big-endian. Used anywhere a
/// "low 32 bits of hash" of an arbitrary byte string is needed (e.g. the DCT modality's
/// text-dependent seed perturbation), mirroring [`KeyDeriver::derive`]'s own seed truncation.
pub fn truncated_hash_u32(data: &[u8]) -> u32 {
    let digest = Sha256::digest(data);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// `SHA256(data)[0..len_hex_chars]`, lowercase hex. Used for the redundant modality's
/// `checksum` field and anywhere else a short content fingerprint is needed.
pub fn truncated_hash_hex(data: &[u8], len_hex_chars: usize) -> String {
    let digest = Sha256::digest(data);
    let full = hex::encode(digest);
    full[..len_hex_chars.min(full.len())].to_string()
}

/// Generates a random lowercase-hex token of `len_bytes` bytes via the system CSPRNG, used for
/// the metadata modality's `Signature` field.
pub fn random_hex_token(len_bytes: usize) -> Result<String, WatermarkError> {
    let mut buf = vec![0u8; len_bytes];
    getrandom::fill(&mut buf).map_err(|e| WatermarkError::CryptoError(e.to_string()))?;
    Ok(hex::encode(buf))
}
