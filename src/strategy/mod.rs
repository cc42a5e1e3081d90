//! The four embedding modalities, each a focused embedder/extractor pair.
//!
//! Every modality consumes a [`crate::pixel::PixelBuffer`] and the keying material produced by
//! [`crate::key::KeyDeriver`]; none of them know about PNG, files, or the façade's retry policy
//! — that dispatch logic lives in [`crate::processor`].

pub mod dct;
pub mod metadata;
pub mod redundant;
pub mod spatial;
