//! The public façade: dispatches to one of the four modalities and exposes the
//! apply/extract/verify surface callers actually use.
//!
//! None of the per-modality logic lives here — this module only derives keying material,
//! builds/parses [`SignatureRecord`]s, and routes to [`crate::strategy`].

use crate::error::WatermarkError;
use crate::key::KeyDeriver;
use crate::pixel::PixelBuffer;
use crate::record::{Modality, SignatureRecord};
use crate::strategy::dct::{DctDetectionResult, DctEmbedder};
use crate::strategy::metadata::{MetadataEmbedder, MetadataRecord};
use crate::strategy::redundant::{RedundantEmbedder, RedundantExtractor};
use crate::strategy::spatial::{SpatialEmbedder, SpatialExtractor};
use crate::payload::PayloadCodec;

/// The result of [`WatermarkProcessor::apply`].
#[derive(Debug, Clone)]
pub struct ApplyResult {
    /// The watermarked image. Identical to the input for the `metadata` modality.
    pub image: PixelBuffer,
    /// 16-hex-char SHA-256 prefix of the record's canonical JSON, for out-of-band auditing.
    pub digest: String,
    /// Present only for the `metadata` modality: the sidecar record the caller must persist
    /// themselves (this crate never writes it into the PNG).
    pub metadata: Option<MetadataRecord>,
}

/// The result of [`WatermarkProcessor::extract`] / [`WatermarkProcessor::extract_auto`].
#[derive(Debug, Clone)]
pub enum ExtractedRecord {
    /// Recovered from the `invisible` or `steganography` modalities.
    Signature(SignatureRecord),
    /// A presence-detection result from the `frequency` modality.
    DctPresence(DctDetectionResult),
}

impl ExtractedRecord {
    /// The `key_hash` carried by this record, if any (a `DctPresence` result carries none).
    pub fn key_hash(&self) -> Option<&str> {
        match self {
            ExtractedRecord::Signature(record) => Some(&record.key_hash),
            ExtractedRecord::DctPresence(_) => None,
        }
    }
}

/// Dispatches `apply`/`extract` to the modality-appropriate embedder/extractor.
pub struct WatermarkProcessor;

impl WatermarkProcessor {
    /// Embeds `text` into `image` under `secret` using the chosen `modality` at the given
    /// `strength`. `timestamp` is a caller-supplied ISO-8601 instant (never sampled internally,
    /// so that repeated calls with identical inputs are byte-identical).
    pub fn apply(
        image: &PixelBuffer,
        text: &str,
        secret: &[u8],
        modality: Modality,
        strength: u8,
        timestamp: String,
    ) -> Result<ApplyResult, WatermarkError> {
        if strength > 100 {
            return Err(WatermarkError::InvalidStrength(strength));
        }
        let derived = KeyDeriver::derive(secret);

        #[cfg(feature = "log")]
        log::info!(modality = modality.as_str(), strength; "applying watermark");

        match modality {
            Modality::Invisible => {
                let record = SignatureRecord::spatial(
                    text,
                    timestamp,
                    image.width(),
                    image.height(),
                    strength,
                    derived.key_hint.clone(),
                );
                let framed = PayloadCodec::encode(&record, &derived.cipher_key)?;
                let mut out = image.clone();
                SpatialEmbedder::embed(&mut out, derived.seed, strength, &framed)?;
                let digest = crate::key::truncated_hash_hex(record.to_canonical_json().as_bytes(), 16);
                Ok(ApplyResult { image: out, digest, metadata: None })
            }
            Modality::Steganography => {
                let record = SignatureRecord::redundant(text, timestamp, strength, derived.key_hint.clone());
                let framed = PayloadCodec::encode(&record, &derived.cipher_key)?;
                let mut out = image.clone();
                RedundantEmbedder::embed(&mut out, derived.seed, strength, &framed)?;
                let digest = crate::key::truncated_hash_hex(record.to_canonical_json().as_bytes(), 16);
                Ok(ApplyResult { image: out, digest, metadata: None })
            }
            Modality::Frequency => {
                let record = SignatureRecord::frequency(text, timestamp, strength, derived.key_hint.clone());
                let out = DctEmbedder::embed(image, derived.seed, text, strength)?;
                let digest = crate::key::truncated_hash_hex(record.to_canonical_json().as_bytes(), 16);
                Ok(ApplyResult { image: out, digest, metadata: None })
            }
            Modality::Metadata => {
                let record = MetadataEmbedder::apply(text, timestamp, derived.key_hint.clone())?;
                let digest = crate::key::truncated_hash_hex(record.to_canonical_json().as_bytes(), 16);
                Ok(ApplyResult { image: image.clone(), digest, metadata: Some(record) })
            }
        }
    }

    /// Recovers a watermark from `image` under `secret` for the given `modality`.
    ///
    /// `candidate_text` is ignored for `invisible`/`steganography` (the text comes back out of
    /// the decrypted record) but is **required** for `frequency`, whose detection is a
    /// correlation test against a specific candidate rather than a blind decode. `metadata`
    /// is never pixel-recoverable — see [`WatermarkError::MetadataNotPixelExtractable`].
    pub fn extract(
        image: &PixelBuffer,
        secret: &[u8],
        modality: Modality,
        strength: u8,
        candidate_text: Option<&str>,
    ) -> Result<ExtractedRecord, WatermarkError> {
        let derived = KeyDeriver::derive(secret);

        #[cfg(feature = "log")]
        log::info!(modality = modality.as_str(), strength; "extracting watermark");

        match modality {
            Modality::Invisible => {
                let bits = SpatialExtractor::extract(image, derived.seed, strength)?;
                let record = PayloadCodec::decode(&bits, &derived.cipher_key)?;
                Ok(ExtractedRecord::Signature(record))
            }
            Modality::Steganography => {
                let bits = RedundantExtractor::extract(image, derived.seed, strength)?;
                let record = PayloadCodec::decode(&bits, &derived.cipher_key)?;
                Ok(ExtractedRecord::Signature(record))
            }
            Modality::Frequency => {
                let text = candidate_text.ok_or(WatermarkError::CandidateTextRequired)?;
                let result = DctEmbedder::detect(image, derived.seed, text, strength)?;
                Ok(ExtractedRecord::DctPresence(result))
            }
            Modality::Metadata => Err(WatermarkError::MetadataNotPixelExtractable),
        }
    }

    /// Tries `invisible`, then `steganography`, then (if `candidate_text` is given) `frequency`,
    /// in that fixed order, returning the first modality whose extractor succeeds. A `frequency`
    /// attempt that completes without error but doesn't actually detect a pattern is not treated
    /// as success. `metadata` is never attempted here since it isn't pixel-recoverable (see
    /// [`Self::extract`]).
    pub fn extract_auto(
        image: &PixelBuffer,
        secret: &[u8],
        strength: u8,
        candidate_text: Option<&str>,
    ) -> Result<ExtractedRecord, WatermarkError> {
        let mut order = vec![Modality::Invisible, Modality::Steganography];
        if candidate_text.is_some() {
            order.push(Modality::Frequency);
        }

        let mut first_err = None;
        for modality in order {
            match Self::extract(image, secret, modality, strength, candidate_text) {
                Ok(ExtractedRecord::DctPresence(result)) if !result.detected => {}
                Ok(record) => return Ok(record),
                Err(err) => {
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
            }
        }
        Err(first_err.unwrap_or(WatermarkError::WrongKeyOrStrength))
    }

    /// Returns true iff `key_hash` (from a [`SignatureRecord`] or [`MetadataRecord`]) matches
    /// `SHA256(secret)[0..16]`.
    pub fn verify_key(key_hash: &str, secret: &[u8]) -> bool {
        key_hash == KeyDeriver::key_hash(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ChannelLayout;

    fn rgb(width: u32, height: u32, fill: u8) -> PixelBuffer {
        PixelBuffer::new(width, height, ChannelLayout::Rgb, vec![fill; (width * height * 3) as usize]).unwrap()
    }

    #[test]
    fn invisible_roundtrips_through_the_facade() {
        let image = rgb(64, 64, 128);
        let result = WatermarkProcessor::apply(
            &image,
            "hi",
            b"hunter2",
            Modality::Invisible,
            100,
            "2025-01-01T00:00:00Z".into(),
        )
        .unwrap();

        match WatermarkProcessor::extract(&result.image, b"hunter2", Modality::Invisible, 100, None).unwrap() {
            ExtractedRecord::Signature(record) => {
                assert_eq!(record.text, "hi");
                assert!(WatermarkProcessor::verify_key(&record.key_hash, b"hunter2"));
                assert!(!WatermarkProcessor::verify_key(&record.key_hash, b"hunter3"));
            }
            other => panic!("expected a signature record, got {other:?}"),
        }
    }

    #[test]
    fn steganography_roundtrips_through_the_facade() {
        let image = rgb(128, 128, 128);
        let result = WatermarkProcessor::apply(
            &image,
            "resilient",
            b"s",
            Modality::Steganography,
            50,
            "2025-01-01T00:00:00Z".into(),
        )
        .unwrap();

        match WatermarkProcessor::extract(&result.image, b"s", Modality::Steganography, 50, None).unwrap() {
            ExtractedRecord::Signature(record) => assert_eq!(record.text, "resilient"),
            other => panic!("expected a signature record, got {other:?}"),
        }
    }

    #[test]
    fn frequency_apply_and_detect_round_trips() {
        let image = rgb(128, 128, 128);
        let result = WatermarkProcessor::apply(
            &image,
            "©owned",
            b"s",
            Modality::Frequency,
            50,
            "2025-01-01T00:00:00Z".into(),
        )
        .unwrap();

        match WatermarkProcessor::extract(&result.image, b"s", Modality::Frequency, 50, Some("©owned")).unwrap() {
            ExtractedRecord::DctPresence(presence) => assert!(presence.detected),
            other => panic!("expected a DCT presence result, got {other:?}"),
        }
    }

    #[test]
    fn frequency_extract_requires_candidate_text() {
        let image = rgb(64, 64, 128);
        let err = WatermarkProcessor::extract(&image, b"s", Modality::Frequency, 50, None).unwrap_err();
        assert!(matches!(err, WatermarkError::CandidateTextRequired));
    }

    #[test]
    fn metadata_apply_leaves_pixels_untouched() {
        let image = rgb(8, 8, 200);
        let result = WatermarkProcessor::apply(
            &image,
            "hi",
            b"k",
            Modality::Metadata,
            50,
            "2025-01-01T00:00:00Z".into(),
        )
        .unwrap();

        assert_eq!(result.image.data(), image.data());
        let record = result.metadata.unwrap();
        assert!(WatermarkProcessor::verify_key(&record.key_hash, b"k"));
        assert!(!WatermarkProcessor::verify_key(&record.key_hash, b"other"));
    }

    #[test]
    fn metadata_has_no_pixel_extraction() {
        let image = rgb(8, 8, 200);
        let err = WatermarkProcessor::extract(&image, b"k", Modality::Metadata, 50, None).unwrap_err();
        assert!(matches!(err, WatermarkError::MetadataNotPixelExtractable));
    }

    #[test]
    fn extract_auto_finds_the_right_modality_without_being_told() {
        let image = rgb(128, 128, 128);
        let result = WatermarkProcessor::apply(
            &image,
            "hi",
            b"hunter2",
            Modality::Steganography,
            50,
            "2025-01-01T00:00:00Z".into(),
        )
        .unwrap();

        match WatermarkProcessor::extract_auto(&result.image, b"hunter2", 50, None).unwrap() {
            ExtractedRecord::Signature(record) => assert_eq!(record.text, "hi"),
            other => panic!("expected a signature record, got {other:?}"),
        }
    }

    #[test]
    fn extract_auto_does_not_claim_success_on_an_unwatermarked_image() {
        let image = rgb(128, 128, 128);
        let err = WatermarkProcessor::extract_auto(&image, b"hunter2", 50, Some("hi")).unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::WrongKeyOrStrength | WatermarkError::InsufficientSelectedPixels
        ));
    }

    #[test]
    fn extract_auto_surfaces_the_first_modalitys_error_not_the_last() {
        let image = rgb(128, 128, 128);
        let result = WatermarkProcessor::apply(
            &image,
            "hi",
            b"hunter2",
            Modality::Invisible,
            100,
            "2025-01-01T00:00:00Z".into(),
        )
        .unwrap();

        // tamper with one ciphertext-region bit (well past the 32-bit length prefix, which at
        // strength 100 occupies the first 32 embedded pixels) so the correct (first-tried)
        // modality fails with a specific diagnosis rather than a generic one from a later,
        // irrelevant modality
        let mut data = result.image.clone().into_data();
        data[100 * 3 + 2] ^= 1;
        let tampered = PixelBuffer::new(result.image.width(), result.image.height(), ChannelLayout::Rgb, data).unwrap();

        let err = WatermarkProcessor::extract_auto(&tampered, b"hunter2", 100, None).unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::DecryptionFailed | WatermarkError::InvalidLength | WatermarkError::BytesNotAligned
        ));
    }

    #[test]
    fn invalid_strength_is_rejected() {
        let image = rgb(8, 8, 128);
        let err = WatermarkProcessor::apply(&image, "hi", b"k", Modality::Invisible, 101, "ts".into()).unwrap_err();
        assert!(matches!(err, WatermarkError::InvalidStrength(101)));
    }
}
