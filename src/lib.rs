//! # keymark — keyed, authenticated image watermarking
//!
//! `keymark` embeds an authenticated, keyed signature into a raster image across four
//! selectable modalities, trading off invisibility, robustness, and capacity:
//!
//! - **`invisible`** — plain spatial LSB, gated by a strength-thinning probability.
//! - **`steganography`** — redundancy-augmented spatial LSB, recovered by majority vote.
//! - **`frequency`** — DCT mid-band additive perturbation (embed-only; recovery is
//!   presence-detection, not payload recovery).
//! - **`metadata`** — a non-pixel sidecar record; the image itself is untouched.
//!
//! Every modality is driven by the same keying material: a secret-derived PRNG seed and a
//! 16-hex-character key hint, both produced by [`KeyDeriver`]. The actual signature payload is
//! authenticated-encrypted (ChaCha20-Poly1305) before it ever touches a pixel, so tampering with
//! so much as a single ciphertext bit is detected rather than silently corrupting the recovered
//! text.
//!
//! ## Quick start
//!
//! ```no_run
//! use keymark::{Modality, WatermarkProcessor};
//! use keymark::png_codec;
//!
//! # fn run() -> Result<(), keymark::WatermarkError> {
//! let png_bytes = std::fs::read("cover.png").unwrap();
//! let (image, info) = png_codec::decode(&png_bytes)?;
//!
//! let applied = WatermarkProcessor::apply(
//!     &image,
//!     "© 2025 Jane Doe",
//!     b"correct horse battery staple",
//!     Modality::Invisible,
//!     80,
//!     "2025-01-01T00:00:00Z".to_string(),
//! )?;
//! std::fs::write("watermarked.png", png_codec::encode(&applied.image, &info)?).unwrap();
//! # Ok(())
//! # }
//! ```
//!
//! ## Core vs. boundary
//!
//! The codec itself (key derivation, payload framing, the PRNG, and the four embed/extract
//! pipelines) never assumes a container format — it only knows [`pixel::PixelBuffer`]. PNG
//! decode/encode lives in [`png_codec`], gated behind the default `png` ambient boundary so the
//! core stays testable in complete isolation from any file format.

mod bitops;
pub mod error;
pub mod key;
pub mod payload;
pub mod pixel;
pub mod png_codec;
pub mod processor;
pub mod prng;
pub mod record;
pub mod strategy;

pub use error::WatermarkError;
pub use pixel::PixelBuffer;
pub use processor::{ApplyResult, ExtractedRecord, WatermarkProcessor};
pub use record::{Modality, SignatureRecord};
