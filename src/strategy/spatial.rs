//! Plain spatial LSB embed/extract (modality: `invisible`).
//!
//! Pixel selection is gated by a strength-thinning probability draw per pixel — at strength
//! `s`, roughly `s`% of pixels in row-major order carry one payload bit each, on the blue
//! channel of RGB images or the sole channel of grayscale ones.

use crate::bitops::{embed_bit, extract_bit};
use crate::error::WatermarkError;
use crate::payload::{bits_to_u32, FramedPayload, MAX_LENGTH_BITS};
use crate::pixel::{ChannelLayout, PixelBuffer};
use crate::prng::Prng;

fn target_channel(image: &PixelBuffer) -> usize {
    match image.channels() {
        ChannelLayout::Rgb => 2,
        ChannelLayout::Gray => 0,
    }
}

/// Embeds a [`FramedPayload`] into the spatial LSB channel.
pub struct SpatialEmbedder;

impl SpatialEmbedder {
    /// Seeds the PRNG, walks pixels in row-major order, and writes one payload bit into every
    /// pixel whose `next_uniform_unit()` draw falls below `strength / 100`. Returns
    /// [`WatermarkError::CapacityExceeded`] if the image runs out before every bit is written.
    pub fn embed(image: &mut PixelBuffer, seed: u32, strength: u8, payload: &FramedPayload) -> Result<usize, WatermarkError> {
        let threshold = strength as f64 / 100.0;
        let channel = target_channel(image);
        let bits = payload.bits();
        let mut prng = Prng::seeded(seed);
        let mut written = 0usize;

        'outer: for row in 0..image.height() {
            for col in 0..image.width() {
                if written >= bits.len() {
                    break 'outer;
                }
                if prng.next_uniform_unit() < threshold {
                    let carrier = image.get(row, col, channel);
                    image.set(row, col, channel, embed_bit(carrier, bits[written]));
                    written += 1;
                }
            }
        }

        if written < bits.len() {
            return Err(WatermarkError::CapacityExceeded);
        }
        Ok(written)
    }
}

/// Extracts the spatial LSB channel's embedded [`FramedPayload`] bits.
pub struct SpatialExtractor;

impl SpatialExtractor {
    /// Mirrors [`SpatialEmbedder::embed`]'s PRNG draws and pixel selection exactly; reads
    /// instead of writes. Returns the full `32 + length` bit sequence ready for
    /// [`crate::payload::PayloadCodec::decode`].
    pub fn extract(image: &PixelBuffer, seed: u32, strength: u8) -> Result<Vec<bool>, WatermarkError> {
        let threshold = strength as f64 / 100.0;
        let channel = target_channel(image);
        let mut prng = Prng::seeded(seed);

        let mut bits = Vec::new();
        let mut needed = 32usize;
        let mut length_known = false;

        'outer: for row in 0..image.height() {
            for col in 0..image.width() {
                if length_known && bits.len() >= needed {
                    break 'outer;
                }
                if prng.next_uniform_unit() < threshold {
                    bits.push(extract_bit(image.get(row, col, channel)));

                    if !length_known && bits.len() == 32 {
                        let length = bits_to_u32(&bits[0..32]) as usize;
                        if length == 0 || length > MAX_LENGTH_BITS {
                            return Err(WatermarkError::WrongKeyOrStrength);
                        }
                        needed = 32 + length;
                        length_known = true;
                    }
                }
            }
        }

        if bits.len() < 32 {
            return Err(WatermarkError::InsufficientSelectedPixels);
        }
        if !length_known || bits.len() < needed {
            return Err(WatermarkError::UnderrunedStream);
        }
        Ok(bits)
    }
}
