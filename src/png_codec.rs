//! The PNG container boundary.
//!
//! The core codec operates purely on [`PixelBuffer`]; this module is the only place that knows
//! about the PNG file format. It decodes a PNG into a `PixelBuffer` plus enough of the source
//! [`png::Info`] to faithfully re-encode it later. Grayscale and RGB, 8-bit-depth PNGs are
//! supported; anything else (palette, 16-bit, interlaced with other color types) is rejected at
//! the boundary rather than coerced.
//!
//! The `metadata` modality never touches pixels at all (see [`crate::strategy::metadata`]) — its
//! record is handed back to the caller as plain data rather than written into the file here;
//! real EXIF embedding is left for a future boundary layer.

use std::io::BufWriter;

use crate::error::WatermarkError;
use crate::pixel::{ChannelLayout, PixelBuffer};

/// Decodes a PNG file's pixel data into a [`PixelBuffer`], alongside the source [`png::Info`]
/// needed to re-encode with matching format characteristics.
pub fn decode(png_data: &[u8]) -> Result<(PixelBuffer, png::Info<'static>), WatermarkError> {
    let decoder = png::Decoder::new(png_data);
    let mut reader = decoder.read_info()?;
    let mut raw = vec![0; reader.output_buffer_size()];
    let frame_info = reader.next_frame(&mut raw)?;
    raw.truncate(frame_info.buffer_size());

    if frame_info.bit_depth != png::BitDepth::Eight {
        return Err(WatermarkError::UnsupportedColorType(format!(
            "{:?} bit depth (only 8-bit samples are supported)",
            frame_info.bit_depth
        )));
    }

    let channels = match frame_info.color_type {
        png::ColorType::Grayscale => ChannelLayout::Gray,
        png::ColorType::Rgb => ChannelLayout::Rgb,
        other => {
            return Err(WatermarkError::UnsupportedColorType(format!(
                "{other:?} (only grayscale and RGB are supported)"
            )))
        }
    };

    let info = reader.info().clone().to_owned();
    let buffer = PixelBuffer::new(frame_info.width, frame_info.height, channels, raw)?;
    Ok((buffer, info))
}

/// Re-encodes a [`PixelBuffer`] as a PNG, copying over the template's ancillary chunks
/// (palette, gamma, chromaticities, animation, transparency) so a re-encoded image keeps the
/// source file's format characteristics.
pub fn encode(image: &PixelBuffer, template: &png::Info) -> Result<Vec<u8>, WatermarkError> {
    let mut writer_buffer = BufWriter::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut writer_buffer, image.width(), image.height());
        encoder.set_color(match image.channels() {
            ChannelLayout::Gray => png::ColorType::Grayscale,
            ChannelLayout::Rgb => png::ColorType::Rgb,
        });
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(template.compression);
        encoder.set_pixel_dims(template.pixel_dims);
        copy_ancillary_chunks(template, &mut encoder);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.data())?;
        writer.finish()?;
    }

    writer_buffer
        .into_inner()
        .map_err(|e| WatermarkError::FileIo(e.into_error()))
}

fn copy_ancillary_chunks<'a, W: std::io::Write>(info: &png::Info, encoder: &mut png::Encoder<'a, W>) {
    if let Some(palette) = &info.palette {
        encoder.set_palette(palette.to_vec());
    }
    if let Some(animation) = &info.animation_control {
        let _ = encoder.set_animated(animation.num_frames, animation.num_plays);
    }
    if let Some(trns) = &info.trns {
        encoder.set_trns(trns.to_vec());
    }
    if let Some(source_gamma) = &info.source_gamma {
        encoder.set_source_gamma(*source_gamma);
    }
    if let Some(source_chromaticities) = &info.source_chromaticities {
        encoder.set_source_chromaticities(*source_chromaticities);
    }
    if let Some(srgb) = &info.srgb {
        encoder.set_source_srgb(*srgb);
    }
}
