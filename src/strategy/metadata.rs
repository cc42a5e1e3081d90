//! Non-pixel sidecar watermark (modality: `metadata`).
//!
//! Unlike the other three modalities, `metadata` never touches a single pixel sample. It
//! produces a small record the caller is responsible for persisting alongside the image
//! (as a sidecar file, a database row, whatever fits); this crate never writes it into the PNG
//! itself. Real EXIF embedding is left as acknowledged future work rather than forced in here.

use serde_json::{Map, Value};

use crate::error::WatermarkError;
use crate::key;

/// Number of random bytes behind [`MetadataRecord::signature`], hex-encoded to 32 characters.
const SIGNATURE_LEN_BYTES: usize = 16;

/// The record written into a PNG's text chunks for the `metadata` modality.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub text: String,
    pub timestamp: String,
    pub key_hash: String,
    /// A random per-application token, unrelated to the secret — present so that two
    /// applications of the same text and key by the same caller are still distinguishable.
    pub signature: String,
}

impl MetadataRecord {
    /// Canonical JSON form, keys lexicographically sorted, used for the façade's audit digest.
    pub fn to_canonical_json(&self) -> String {
        let mut map = Map::new();
        map.insert("text".to_string(), Value::String(self.text.clone()));
        map.insert("timestamp".to_string(), Value::String(self.timestamp.clone()));
        map.insert("key_hash".to_string(), Value::String(self.key_hash.clone()));
        map.insert("signature".to_string(), Value::String(self.signature.clone()));
        Value::Object(map).to_string()
    }
}

/// Produces [`MetadataRecord`]s for the `metadata` modality.
pub struct MetadataEmbedder;

impl MetadataEmbedder {
    /// Builds a record, minting a fresh random signature token via the system CSPRNG.
    pub fn apply(text: &str, timestamp: String, key_hash: String) -> Result<MetadataRecord, WatermarkError> {
        let signature = key::random_hex_token(SIGNATURE_LEN_BYTES)?;
        Ok(MetadataRecord {
            text: text.to_string(),
            timestamp,
            key_hash,
            signature,
        })
    }
}
