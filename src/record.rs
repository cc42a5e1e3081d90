//! The canonical plaintext signature record and the tagged modality union.

use serde_json::{Map, Value};

use crate::error::WatermarkError;

/// The closed set of embedding channels this crate supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Plain spatial LSB, pixel selection gated by a strength-thinning probability.
    Invisible,
    /// Redundancy-augmented spatial LSB, decoded by majority vote.
    Steganography,
    /// DCT mid-band additive perturbation. Embed-only; extraction is presence-detection.
    Frequency,
    /// Non-pixel sidecar record; no pixel modification.
    Metadata,
}

impl Modality {
    /// The wire tag for this modality, as used in `SignatureRecord.method` and the HTTP
    /// boundary's `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Invisible => "invisible",
            Modality::Steganography => "steganography",
            Modality::Frequency => "frequency_domain",
            Modality::Metadata => "metadata",
        }
    }

    /// Parses a modality tag, returning [`WatermarkError::InvalidModality`] for anything else.
    pub fn parse(tag: &str) -> Result<Self, WatermarkError> {
        match tag {
            "invisible" => Ok(Modality::Invisible),
            "steganography" => Ok(Modality::Steganography),
            "frequency" | "frequency_domain" => Ok(Modality::Frequency),
            "metadata" => Ok(Modality::Metadata),
            other => Err(WatermarkError::InvalidModality(other.to_string())),
        }
    }
}

/// The canonical plaintext record carried inside every non-metadata watermark.
///
/// Field presence varies by modality: `invisible` carries `dimensions` + `protection_level`,
/// `frequency_domain` carries `strength`, and `steganography` carries `protection_level` +
/// `checksum` — no modality carries all of them at once.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureRecord {
    pub text: String,
    pub timestamp: String,
    pub method: Modality,
    pub dimensions: Option<(u32, u32)>,
    pub strength: u8,
    pub checksum: Option<String>,
    pub key_hash: String,
}

impl SignatureRecord {
    /// Builds a record for the `invisible` modality.
    pub fn spatial(text: &str, timestamp: String, width: u32, height: u32, strength: u8, key_hash: String) -> Self {
        Self {
            text: text.to_string(),
            timestamp,
            method: Modality::Invisible,
            dimensions: Some((width, height)),
            strength,
            checksum: None,
            key_hash,
        }
    }

    /// Builds a record for the `steganography` modality, including the redundancy checksum.
    pub fn redundant(text: &str, timestamp: String, strength: u8, key_hash: String) -> Self {
        Self {
            text: text.to_string(),
            timestamp,
            method: Modality::Steganography,
            dimensions: None,
            strength,
            checksum: Some(crate::key::truncated_hash_hex(text.as_bytes(), 16)),
            key_hash,
        }
    }

    /// Builds a record for the `frequency_domain` modality.
    pub fn frequency(text: &str, timestamp: String, strength: u8, key_hash: String) -> Self {
        Self {
            text: text.to_string(),
            timestamp,
            method: Modality::Frequency,
            dimensions: None,
            strength,
            checksum: None,
            key_hash,
        }
    }

    /// Serializes this record into its canonical byte form: UTF-8 JSON, lexicographically
    /// sorted keys, no insignificant whitespace. `serde_json::Map` is backed by a `BTreeMap`
    /// (this crate does not enable `preserve_order`), so key ordering falls out of the
    /// serializer itself rather than needing manual sorting.
    pub fn to_canonical_json(&self) -> String {
        let mut map = Map::new();
        map.insert("text".to_string(), Value::String(self.text.clone()));
        map.insert("timestamp".to_string(), Value::String(self.timestamp.clone()));
        map.insert("method".to_string(), Value::String(self.method.as_str().to_string()));
        map.insert("key_hash".to_string(), Value::String(self.key_hash.clone()));

        match self.method {
            Modality::Invisible => {
                if let Some((w, h)) = self.dimensions {
                    map.insert("dimensions".to_string(), Value::String(format!("{w}x{h}")));
                }
                map.insert("protection_level".to_string(), Value::from(self.strength));
            }
            Modality::Steganography => {
                map.insert("protection_level".to_string(), Value::from(self.strength));
                if let Some(checksum) = &self.checksum {
                    map.insert("checksum".to_string(), Value::String(checksum.clone()));
                }
            }
            Modality::Frequency => {
                map.insert("strength".to_string(), Value::from(self.strength));
            }
            Modality::Metadata => {}
        }

        Value::Object(map).to_string()
    }

    /// Parses bytes produced by [`Self::to_canonical_json`], failing with
    /// [`WatermarkError::MalformedRecord`] on any structural defect.
    pub fn from_canonical_json(bytes: &[u8]) -> Result<Self, WatermarkError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| WatermarkError::MalformedRecord(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| WatermarkError::MalformedRecord("top-level value is not an object".into()))?;

        let field_str = |key: &str| -> Result<String, WatermarkError> {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| WatermarkError::MalformedRecord(format!("missing or non-string field `{key}`")))
        };

        let text = field_str("text")?;
        let timestamp = field_str("timestamp")?;
        let method_tag = field_str("method")?;
        let method = Modality::parse(&method_tag)
            .map_err(|_| WatermarkError::MalformedRecord(format!("unknown method `{method_tag}`")))?;
        let key_hash = field_str("key_hash")?;

        let dimensions = obj
            .get("dimensions")
            .and_then(Value::as_str)
            .and_then(|s| {
                let (w, h) = s.split_once('x')?;
                Some((w.parse().ok()?, h.parse().ok()?))
            });

        let strength = obj
            .get("protection_level")
            .or_else(|| obj.get("strength"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u8;

        let checksum = obj.get("checksum").and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            text,
            timestamp,
            method,
            dimensions,
            strength,
            checksum,
            key_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_json_roundtrips_spatial() {
        let record = SignatureRecord::spatial("hi", "2025-01-01T00:00:00Z".into(), 8, 8, 100, "abc123".into());
        let json = record.to_canonical_json();
        let parsed = SignatureRecord::from_canonical_json(json.as_bytes()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn canonical_json_roundtrips_redundant() {
        let record = SignatureRecord::redundant("©2025", "2025-01-01T00:00:00Z".into(), 50, "abc123".into());
        let json = record.to_canonical_json();
        let parsed = SignatureRecord::from_canonical_json(json.as_bytes()).unwrap();
        assert_eq!(parsed, record);
        assert!(parsed.checksum.is_some());
        assert_eq!(parsed.strength, 50);
    }

    #[test]
    fn canonical_json_is_pure_function_of_fields() {
        let a = SignatureRecord::spatial("hi", "ts".into(), 8, 8, 50, "hint".into());
        let b = SignatureRecord::spatial("hi", "ts".into(), 8, 8, 50, "hint".into());
        assert_eq!(a.to_canonical_json(), b.to_canonical_json());
    }

    #[test]
    fn canonical_json_has_sorted_keys() {
        let record = SignatureRecord::spatial("hi", "ts".into(), 8, 8, 50, "hint".into());
        let json = record.to_canonical_json();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = SignatureRecord::from_canonical_json(b"not json").unwrap_err();
        assert!(matches!(err, WatermarkError::MalformedRecord(_)));
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = SignatureRecord::from_canonical_json(br#"{"text":"hi"}"#).unwrap_err();
        assert!(matches!(err, WatermarkError::MalformedRecord(_)));
    }

    #[test]
    fn modality_parse_rejects_unknown_tag() {
        assert!(matches!(
            Modality::parse("bogus"),
            Err(WatermarkError::InvalidModality(_))
        ));
    }
}
