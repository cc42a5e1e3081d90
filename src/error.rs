//! # Error types for keymark watermark operations
//!
//! This module defines the error type returned by every fallible operation in the
//! keyed watermark codec, from key derivation through pixel embedding and PNG I/O.
//!
//! ## Error Categories
//!
//! - **Input validation**: [`InvalidModality`](WatermarkError::InvalidModality),
//!   [`InvalidStrength`](WatermarkError::InvalidStrength),
//!   [`InvalidPixelBuffer`](WatermarkError::InvalidPixelBuffer)
//! - **Capacity**: [`CapacityExceeded`](WatermarkError::CapacityExceeded),
//!   [`InsufficientSelectedPixels`](WatermarkError::InsufficientSelectedPixels)
//! - **Payload framing**: [`InvalidLength`](WatermarkError::InvalidLength),
//!   [`BytesNotAligned`](WatermarkError::BytesNotAligned),
//!   [`UnderrunedStream`](WatermarkError::UnderrunedStream)
//! - **Cryptographic**: [`DecryptionFailed`](WatermarkError::DecryptionFailed),
//!   [`WrongKeyOrStrength`](WatermarkError::WrongKeyOrStrength),
//!   [`CryptoError`](WatermarkError::CryptoError)
//! - **Record parsing**: [`MalformedRecord`](WatermarkError::MalformedRecord)
//! - **PNG / I/O boundary**: [`PngDecodingError`](WatermarkError::PngDecodingError),
//!   [`PngEncodingError`](WatermarkError::PngEncodingError),
//!   [`UnsupportedColorType`](WatermarkError::UnsupportedColorType),
//!   [`FileIo`](WatermarkError::FileIo)
//!
//! ## Example
//!
//! ```rust
//! use keymark::{WatermarkError, WatermarkProcessor, Modality};
//! use keymark::pixel::{PixelBuffer, ChannelLayout};
//!
//! let image = PixelBuffer::new(1, 1, ChannelLayout::Gray, vec![128]).unwrap();
//! match WatermarkProcessor::apply(&image, "hi", b"secret", Modality::Invisible, 100, "2025-01-01T00:00:00Z".into()) {
//!     Ok(result) => println!("digest = {}", result.digest),
//!     Err(WatermarkError::CapacityExceeded) => eprintln!("payload too large for this image"),
//!     Err(other) => eprintln!("watermarking failed: {other}"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Comprehensive error type for all keymark watermarking operations.
///
/// The core codec never panics and never throws; every fallible function returns
/// `Result<T, WatermarkError>`. Callers that need to distinguish "extraction succeeded but the
/// key hash doesn't match" from an actual error should note that this is *not* represented as
/// an error variant here — see [`WatermarkProcessor::verify_key`](crate::WatermarkProcessor::verify_key).
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// The requested modality tag is not one of `invisible | steganography | frequency | metadata`.
    #[error("unknown watermark modality: {0}")]
    InvalidModality(String),

    /// Strength was outside the inclusive range `[0, 100]`.
    #[error("strength must be in 0..=100, got {0}")]
    InvalidStrength(u8),

    /// The pixel buffer's declared dimensions and channel layout don't match its data length.
    #[error("pixel buffer dimensions do not match the supplied data length")]
    InvalidPixelBuffer,

    /// The payload is longer than the number of pixels the chosen strength would select.
    ///
    /// ## Common causes
    /// - Strength is too low for the image size.
    /// - The text payload is too long for a small image.
    ///
    /// ## Solutions
    /// - Raise `strength`, use a larger image, or shorten the text.
    #[error("payload exceeds selectable capacity at this strength")]
    CapacityExceeded,

    /// At extract time, fewer pixels matched the strength thinning than were needed to recover
    /// even the 32-bit length prefix.
    #[error("not enough pixels matched the strength thinning to recover the length prefix")]
    InsufficientSelectedPixels,

    /// The recovered length prefix was `<= 0` or `> 100_000` bits — almost always a symptom of
    /// the wrong secret or the wrong strength.
    #[error("recovered payload length is invalid (almost always a wrong-key symptom)")]
    InvalidLength,

    /// The recovered length prefix was not a multiple of 8 bits.
    #[error("recovered length prefix is not a multiple of 8 bits")]
    BytesNotAligned,

    /// Fewer embedded bits were available than the framing header promised.
    #[error("extraction ran out of embedded bits before the full payload could be recovered")]
    UnderrunedStream,

    /// Spatial/redundant extraction recovered a structurally invalid length prefix; reported as
    /// a friendlier "wrong key or strength" diagnosis at the embedder/extractor boundary.
    #[error("wrong key or strength: could not recover a valid payload")]
    WrongKeyOrStrength,

    /// AEAD authentication tag mismatch — indistinguishable from "wrong key" without the key.
    #[error("authentication tag mismatch: wrong key, or the image was tampered with")]
    DecryptionFailed,

    /// The decrypted plaintext was not a well-formed canonical signature record.
    #[error("decrypted bytes are not a canonical signature record: {0}")]
    MalformedRecord(String),

    /// The `frequency` modality requires a three-channel (RGB) pixel buffer.
    #[error("frequency-domain watermarking requires an RGB image")]
    DctRequiresRgb,

    /// `WatermarkProcessor::extract` was called for the `frequency` modality without the
    /// candidate text needed to regenerate its detection pattern; unlike the other modalities,
    /// `frequency` watermarks are not blindly recoverable (see [`crate::strategy::dct`]).
    #[error("frequency-domain extraction requires the candidate text that was originally embedded")]
    CandidateTextRequired,

    /// `WatermarkProcessor::extract`/`extract_auto` was called for the `metadata` modality,
    /// which produces a sidecar record rather than a pixel-recoverable one; callers must read
    /// the record they received from `apply` (or its serialized form) directly instead.
    #[error("the metadata modality has no pixel-recoverable extraction; use the sidecar record returned by apply")]
    MetadataNotPixelExtractable,

    /// A cryptographic primitive (AEAD encrypt/decrypt, HKDF expand, CSPRNG fill) failed.
    #[error("cryptographic operation failed: {0}")]
    CryptoError(String),

    /// PNG decoding failed at the boundary layer.
    #[error("PNG decoding error: {0}")]
    PngDecodingError(#[from] png::DecodingError),

    /// PNG encoding failed at the boundary layer.
    #[error("PNG encoding error: {0}")]
    PngEncodingError(#[from] png::EncodingError),

    /// The source PNG's color type isn't one this codec can decode (only 8-bit grayscale and
    /// RGB are supported).
    #[error("unsupported PNG color type: {0}")]
    UnsupportedColorType(String),

    /// A file-system operation failed at the CLI/boundary layer.
    #[error("file I/O failed")]
    FileIo(#[from] io::Error),
}
