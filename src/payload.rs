//! Payload framing and authenticated encryption.
//!
//! `PayloadCodec` turns a [`SignatureRecord`] into the exact bit string written into pixel
//! LSBs, and back. The wire shape is:
//!
//! ```text
//! FramedPayload = length(32 bits, MSB-first, counts bits of ciphertext) || ciphertext bits
//! ciphertext    = version(1 byte) || nonce(12 bytes) || AEAD(ciphertext + tag)
//! ```
//!
//! Every ciphertext byte is emitted MSB-first; deviating from that ordering breaks
//! interoperability with anything reading the bitstream the same way this crate writes it.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};

use crate::error::WatermarkError;
use crate::key::CIPHER_KEY_LEN;
use crate::record::SignatureRecord;

/// Maximum permitted bit-length of the ciphertext carried by a [`FramedPayload`].
pub const MAX_LENGTH_BITS: usize = 100_000;

const AEAD_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

/// The exact bit string embedded into pixel LSBs: a 32-bit length prefix followed by ciphertext
/// bits.
#[derive(Debug, Clone)]
pub struct FramedPayload {
    bits: Vec<bool>,
}

impl FramedPayload {
    /// The full bit sequence, length prefix included.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Total number of bits in this framed payload.
    pub fn len_bits(&self) -> usize {
        self.bits.len()
    }

    fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

/// Encodes/decodes [`SignatureRecord`]s to and from [`FramedPayload`] bitstreams.
pub struct PayloadCodec;

impl PayloadCodec {
    /// `canonicalize -> encrypt -> frame`.
    pub fn encode(record: &SignatureRecord, cipher_key: &[u8; CIPHER_KEY_LEN]) -> Result<FramedPayload, WatermarkError> {
        let plaintext = record.to_canonical_json();
        let ciphertext = aead_encrypt(cipher_key, plaintext.as_bytes())?;
        let bit_len = ciphertext.len() * 8;
        if bit_len == 0 || bit_len > MAX_LENGTH_BITS {
            return Err(WatermarkError::InvalidLength);
        }

        let mut bits = Vec::with_capacity(32 + bit_len);
        push_u32_msb_first(&mut bits, bit_len as u32);
        for byte in &ciphertext {
            push_byte_msb_first(&mut bits, *byte);
        }
        Ok(FramedPayload::from_bits(bits))
    }

    /// `parse length -> take next length bits -> assemble bytes MSB-first -> decrypt -> parse canonical form`.
    pub fn decode(bits: &[bool], cipher_key: &[u8; CIPHER_KEY_LEN]) -> Result<SignatureRecord, WatermarkError> {
        if bits.len() < 32 {
            return Err(WatermarkError::UnderrunedStream);
        }
        let length = bits_to_u32(&bits[0..32]) as usize;
        if length == 0 || length > MAX_LENGTH_BITS {
            return Err(WatermarkError::InvalidLength);
        }
        if length % 8 != 0 {
            return Err(WatermarkError::BytesNotAligned);
        }
        if bits.len() < 32 + length {
            return Err(WatermarkError::UnderrunedStream);
        }

        let ciphertext = bits_to_bytes(&bits[32..32 + length]);
        let plaintext = aead_decrypt(cipher_key, &ciphertext)?;
        SignatureRecord::from_canonical_json(&plaintext)
    }
}

fn aead_encrypt(key: &[u8; CIPHER_KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, WatermarkError> {
    let cipher = ChaCha20Poly1305::new(key.into());
    let mut nonce_bytes = [0u8; NONCE_LEN];
    getrandom::fill(&mut nonce_bytes).map_err(|e| WatermarkError::CryptoError(e.to_string()))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext_and_tag = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| WatermarkError::CryptoError("AEAD encryption failed".into()))?;

    let mut out = Vec::with_capacity(1 + NONCE_LEN + ciphertext_and_tag.len());
    out.push(AEAD_VERSION);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext_and_tag);
    Ok(out)
}

fn aead_decrypt(key: &[u8; CIPHER_KEY_LEN], envelope: &[u8]) -> Result<Vec<u8>, WatermarkError> {
    if envelope.len() < 1 + NONCE_LEN || envelope[0] != AEAD_VERSION {
        return Err(WatermarkError::DecryptionFailed);
    }
    let nonce = Nonce::from_slice(&envelope[1..1 + NONCE_LEN]);
    let cipher = ChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(nonce, &envelope[1 + NONCE_LEN..])
        .map_err(|_| WatermarkError::DecryptionFailed)
}

fn push_u32_msb_first(bits: &mut Vec<bool>, value: u32) {
    for i in (0..32).rev() {
        bits.push(((value >> i) & 1) == 1);
    }
}

fn push_byte_msb_first(bits: &mut Vec<bool>, byte: u8) {
    for i in (0..8).rev() {
        bits.push(((byte >> i) & 1) == 1);
    }
}

/// Assembles a big-endian `u32` from exactly 32 bits, MSB-first.
pub(crate) fn bits_to_u32(bits: &[bool]) -> u32 {
    bits.iter().fold(0u32, |acc, &bit| (acc << 1) | bit as u32)
}

/// Assembles bytes from a bit slice whose length is a multiple of 8, MSB-first within each byte.
pub(crate) fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect()
}
