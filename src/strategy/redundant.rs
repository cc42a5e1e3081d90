//! Redundancy-augmented spatial LSB embed/extract (modality: `steganography`).
//!
//! Each payload bit is written `r = max(1, strength / 25)` times consecutively, each copy on a
//! channel chosen by a pre-materialized pick array, and recovered by majority vote. The PRNG
//! instance is never re-seeded mid-extraction — extraction draws the header's channel picks,
//! decodes the length, then keeps drawing from the *same* live generator for the remainder,
//! which is bit-for-bit equivalent to materializing the whole pick array from one seeded run up
//! front. Re-seeding partway through (and hoping a data-dependent draw count realigns with the
//! embedder) would couple PRNG state to the data being recovered and is avoided entirely.

use crate::bitops::{embed_bit, extract_bit};
use crate::error::WatermarkError;
use crate::payload::{bits_to_u32, FramedPayload, MAX_LENGTH_BITS};
use crate::pixel::{ChannelLayout, PixelBuffer};
use crate::prng::Prng;

/// Embeds a [`FramedPayload`] redundantly, one bit per pixel, across a PRNG-picked channel.
pub struct RedundantEmbedder;

impl RedundantEmbedder {
    /// `r = max(1, strength / 25)`.
    pub fn redundancy_factor(strength: u8) -> usize {
        (strength as usize / 25).max(1)
    }

    /// Pre-computes the full channel-pick array for `bits.len() * r` positions from a single
    /// seeded PRNG run, then writes each bit `r` times consecutively, one pixel per write, in
    /// row-major order.
    pub fn embed(image: &mut PixelBuffer, seed: u32, strength: u8, payload: &FramedPayload) -> Result<usize, WatermarkError> {
        let r = Self::redundancy_factor(strength);
        let bits = payload.bits();
        let total_bits = bits.len() * r;
        let total_pixels = image.pixel_count();
        if total_bits > total_pixels {
            return Err(WatermarkError::CapacityExceeded);
        }

        let mut prng = Prng::seeded(seed);
        let channel_pattern = draw_channel_pattern(&mut prng, total_bits, image.channels());

        let width = image.width();
        for (k, &channel) in channel_pattern.iter().enumerate() {
            let row = (k as u32) / width;
            let col = (k as u32) % width;
            let bit = bits[k / r];
            let carrier = image.get(row, col, channel);
            image.set(row, col, channel, embed_bit(carrier, bit));
        }

        Ok(total_bits)
    }
}

/// Recovers the redundantly-embedded [`FramedPayload`] bits, decoding each `r`-bit block by
/// majority vote.
pub struct RedundantExtractor;

impl RedundantExtractor {
    /// Draws the header's channel picks, majority-decodes the 32-bit length, then continues
    /// drawing from the same PRNG instance for the rest of the payload.
    pub fn extract(image: &PixelBuffer, seed: u32, strength: u8) -> Result<Vec<bool>, WatermarkError> {
        let r = RedundantEmbedder::redundancy_factor(strength);
        let total_pixels = image.pixel_count();
        let header_pixels = 32 * r;

        if total_pixels < header_pixels {
            return Err(WatermarkError::InsufficientSelectedPixels);
        }

        let mut prng = Prng::seeded(seed);
        let header_pattern = draw_channel_pattern(&mut prng, header_pixels, image.channels());
        let header_raw = read_bits(image, &header_pattern, 0);
        let length_bits = majority_decode(&header_raw, r);
        let length = bits_to_u32(&length_bits) as usize;
        if length == 0 || length > MAX_LENGTH_BITS {
            return Err(WatermarkError::WrongKeyOrStrength);
        }

        let total_bits_needed = (32 + length) * r;
        if total_pixels < total_bits_needed {
            return Err(WatermarkError::UnderrunedStream);
        }

        let remaining = total_bits_needed - header_pixels;
        let tail_pattern = draw_channel_pattern(&mut prng, remaining, image.channels());
        let tail_raw = read_bits(image, &tail_pattern, header_pixels);

        let mut raw = header_raw;
        raw.extend(tail_raw);
        Ok(majority_decode(&raw, r))
    }
}

fn draw_channel_pattern(prng: &mut Prng, count: usize, channels: ChannelLayout) -> Vec<usize> {
    (0..count)
        .map(|_| {
            let draw = prng.next_int(3) as usize;
            match channels {
                ChannelLayout::Rgb => draw,
                ChannelLayout::Gray => 0,
            }
        })
        .collect()
}

fn read_bits(image: &PixelBuffer, pattern: &[usize], pixel_offset: usize) -> Vec<bool> {
    let width = image.width();
    pattern
        .iter()
        .enumerate()
        .map(|(i, &channel)| {
            let pixel_index = (pixel_offset + i) as u32;
            let row = pixel_index / width;
            let col = pixel_index % width;
            extract_bit(image.get(row, col, channel))
        })
        .collect()
}

/// Decodes each consecutive block of `r` raw bits by majority vote, ties resolved to `false`.
fn majority_decode(raw: &[bool], r: usize) -> Vec<bool> {
    raw.chunks(r)
        .map(|chunk| {
            let ones = chunk.iter().filter(|&&b| b).count();
            ones * 2 > chunk.len()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyDeriver;
    use crate::payload::PayloadCodec;
    use crate::record::SignatureRecord;

    fn rgb(width: u32, height: u32, fill: u8) -> PixelBuffer {
        PixelBuffer::new(width, height, ChannelLayout::Rgb, vec![fill; (width * height * 3) as usize]).unwrap()
    }

    fn framed_payload(text: &str, secret: &[u8], strength: u8) -> (FramedPayload, u32, [u8; crate::key::CIPHER_KEY_LEN]) {
        let derived = KeyDeriver::derive(secret);
        let record = SignatureRecord::redundant(text, "2025-01-01T00:00:00Z".into(), strength, derived.key_hint.clone());
        (
            PayloadCodec::encode(&record, &derived.cipher_key).unwrap(),
            derived.seed,
            derived.cipher_key,
        )
    }

    #[test]
    fn redundancy_factor_is_strength_divided_by_25_floor_at_1() {
        assert_eq!(RedundantEmbedder::redundancy_factor(0), 1);
        assert_eq!(RedundantEmbedder::redundancy_factor(24), 1);
        assert_eq!(RedundantEmbedder::redundancy_factor(25), 1);
        assert_eq!(RedundantEmbedder::redundancy_factor(50), 2);
        assert_eq!(RedundantEmbedder::redundancy_factor(100), 4);
    }

    #[test]
    fn embed_then_extract_roundtrips() {
        let mut image = rgb(256, 256, 128);
        let (framed, seed, key) = framed_payload("\u{a9}2025", b"s", 50);
        RedundantEmbedder::embed(&mut image, seed, 50, &framed).unwrap();

        let bits = RedundantExtractor::extract(&image, seed, 50).unwrap();
        let record = PayloadCodec::decode(&bits, &key).unwrap();
        assert_eq!(record.text, "\u{a9}2025");
    }

    #[test]
    fn capacity_exceeded_when_payload_too_large_for_pixel_count() {
        let mut image = rgb(4, 4, 128);
        let (framed, seed, _) = framed_payload("way too long for a 4x4 image at high redundancy", b"s", 100);
        let err = RedundantEmbedder::embed(&mut image, seed, 100, &framed).unwrap_err();
        assert!(matches!(err, WatermarkError::CapacityExceeded));
    }

    #[test]
    fn majority_decode_resolves_ties_to_false() {
        assert_eq!(majority_decode(&[true, false], 2), vec![false]);
        assert_eq!(majority_decode(&[true, true, false], 3), vec![true]);
    }

    #[test]
    fn grayscale_ignores_channel_but_still_draws() {
        let mut image = PixelBuffer::new(64, 64, ChannelLayout::Gray, vec![100; 64 * 64]).unwrap();
        let derived = KeyDeriver::derive(b"gray-secret");
        let record = SignatureRecord::redundant("g", "ts".into(), 50, derived.key_hint.clone());
        let framed = PayloadCodec::encode(&record, &derived.cipher_key).unwrap();
        RedundantEmbedder::embed(&mut image, derived.seed, 50, &framed).unwrap();

        let bits = RedundantExtractor::extract(&image, derived.seed, 50).unwrap();
        let decoded = PayloadCodec::decode(&bits, &derived.cipher_key).unwrap();
        assert_eq!(decoded.text, "g");
    }
}
