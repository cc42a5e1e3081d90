//! DCT mid-band additive perturbation (modality: `frequency`).
//!
//! Embed-only: the luminance plane of the image is transformed into the frequency domain, a
//! PRNG-generated Gaussian-like pattern is added to its mid-band coefficients, and the result
//! is transformed back. Extraction of the original payload is not possible from this modality by
//! design — callers get a presence-detection response via correlation against a regenerated
//! pattern instead.

use crate::error::WatermarkError;
use crate::key::truncated_hash_u32;
use crate::pixel::{ChannelLayout, PixelBuffer};
use crate::prng::Prng;

/// Correlation threshold above which [`DctEmbedder::detect`] reports the watermark as present.
/// Chosen empirically: an unwatermarked image's mid-band DCT coefficients are uncorrelated
/// noise against an independently-generated pattern (expected correlation near 0), while an
/// embedded `strength=50` perturbation reliably registers well above this bound.
pub const DCT_DETECTION_THRESHOLD: f64 = 0.15;

/// The mid-band rectangle `[H/4..3H/4) x [W/4..3W/4)` that carries the perturbation.
fn mid_band(height: usize, width: usize) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
    (height / 4..3 * height / 4, width / 4..3 * width / 4)
}

/// Result of [`DctEmbedder::detect`].
#[derive(Debug, Clone, Copy)]
pub struct DctDetectionResult {
    /// Whether the correlation exceeded [`DCT_DETECTION_THRESHOLD`].
    pub detected: bool,
    /// The Pearson correlation coefficient between the observed mid-band coefficients and the
    /// regenerated pattern.
    pub correlation: f64,
}

/// Embeds and detects the frequency-domain watermark.
pub struct DctEmbedder;

impl DctEmbedder {
    /// Performs the embed described in the module docs, returning a freshly owned watermarked
    /// buffer of identical dimensions.
    pub fn embed(image: &PixelBuffer, seed: u32, text: &str, strength: u8) -> Result<PixelBuffer, WatermarkError> {
        if image.channels() != ChannelLayout::Rgb {
            return Err(WatermarkError::DctRequiresRgb);
        }
        let (height, width) = (image.height() as usize, image.width() as usize);

        let (mut y_plane, u_plane, v_plane) = rgb_to_yuv(image);
        let mut coeffs = dct2d(&y_plane, height, width);
        let pattern = generate_pattern(seed, text, strength, height, width);

        for row in 0..height {
            for col in 0..width {
                coeffs[row][col] += pattern[row][col] * 10.0;
            }
        }

        y_plane = idct2d(&coeffs, height, width);
        let data = yuv_to_rgb(&y_plane, &u_plane, &v_plane);
        PixelBuffer::new(image.width(), image.height(), ChannelLayout::Rgb, data)
    }

    /// Regenerates the same mid-band pattern the embed step would have used and reports its
    /// correlation against the candidate image's observed DCT coefficients.
    pub fn detect(image: &PixelBuffer, seed: u32, text: &str, strength: u8) -> Result<DctDetectionResult, WatermarkError> {
        if image.channels() != ChannelLayout::Rgb {
            return Err(WatermarkError::DctRequiresRgb);
        }
        let (height, width) = (image.height() as usize, image.width() as usize);

        let (y_plane, _, _) = rgb_to_yuv(image);
        let coeffs = dct2d(&y_plane, height, width);
        let pattern = generate_pattern(seed, text, strength, height, width);

        let (rows, cols) = mid_band(height, width);
        let mut observed = Vec::with_capacity(rows.len() * cols.len());
        let mut expected = Vec::with_capacity(rows.len() * cols.len());
        for row in rows {
            for col in cols.clone() {
                observed.push(coeffs[row][col]);
                expected.push(pattern[row][col]);
            }
        }

        let correlation = pearson_correlation(&observed, &expected);
        Ok(DctDetectionResult {
            detected: correlation.abs() > DCT_DETECTION_THRESHOLD,
            correlation,
        })
    }
}

fn generate_pattern(seed: u32, text: &str, strength: u8, height: usize, width: usize) -> Vec<Vec<f64>> {
    let combined_seed = seed ^ truncated_hash_u32(text.as_bytes());
    let mut prng = Prng::seeded(combined_seed);
    let scale = strength as f64 / 100.0;
    let (rows, cols) = mid_band(height, width);

    let mut pattern = vec![vec![0.0; width]; height];
    for row in 0..height {
        for col in 0..width {
            let sample = prng.next_gaussian() * scale;
            if rows.contains(&row) && cols.contains(&col) {
                pattern[row][col] = sample;
            }
        }
    }
    pattern
}

fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// BT.601 RGB -> Y'CbCr-like YUV decomposition, returned as three `height x width` planes.
fn rgb_to_yuv(image: &PixelBuffer) -> (Vec<Vec<f64>>, Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let (height, width) = (image.height(), image.width());
    let mut y = vec![vec![0.0; width as usize]; height as usize];
    let mut u = vec![vec![0.0; width as usize]; height as usize];
    let mut v = vec![vec![0.0; width as usize]; height as usize];

    for row in 0..height {
        for col in 0..width {
            let r = image.get(row, col, 0) as f64;
            let g = image.get(row, col, 1) as f64;
            let b = image.get(row, col, 2) as f64;
            y[row as usize][col as usize] = 0.299 * r + 0.587 * g + 0.114 * b;
            u[row as usize][col as usize] = -0.14713 * r - 0.28886 * g + 0.436 * b;
            v[row as usize][col as usize] = 0.615 * r - 0.51499 * g - 0.10001 * b;
        }
    }
    (y, u, v)
}

fn yuv_to_rgb(y: &[Vec<f64>], u: &[Vec<f64>], v: &[Vec<f64>]) -> Vec<u8> {
    let height = y.len();
    let width = if height == 0 { 0 } else { y[0].len() };
    let mut out = Vec::with_capacity(height * width * 3);

    for row in 0..height {
        for col in 0..width {
            let yy = y[row][col];
            let uu = u[row][col];
            let vv = v[row][col];
            let r = yy + 1.13983 * vv;
            let g = yy - 0.39465 * uu - 0.58060 * vv;
            let b = yy + 2.03211 * uu;
            out.push(clamp_to_u8(r));
            out.push(clamp_to_u8(g));
            out.push(clamp_to_u8(b));
        }
    }
    out
}

fn clamp_to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// 2-D separable orthonormal DCT-II: 1-D DCT along each row, then along each column.
fn dct2d(plane: &[Vec<f64>], height: usize, width: usize) -> Vec<Vec<f64>> {
    let mut rows_done = vec![vec![0.0; width]; height];
    for row in 0..height {
        rows_done[row] = dct1d(&plane[row]);
    }

    let mut out = vec![vec![0.0; width]; height];
    for col in 0..width {
        let column: Vec<f64> = (0..height).map(|row| rows_done[row][col]).collect();
        let transformed = dct1d(&column);
        for row in 0..height {
            out[row][col] = transformed[row];
        }
    }
    out
}

/// Inverse of [`dct2d`]: 1-D inverse DCT along each column, then along each row.
fn idct2d(coeffs: &[Vec<f64>], height: usize, width: usize) -> Vec<Vec<f64>> {
    let mut cols_done = vec![vec![0.0; width]; height];
    for col in 0..width {
        let column: Vec<f64> = (0..height).map(|row| coeffs[row][col]).collect();
        let transformed = idct1d(&column);
        for row in 0..height {
            cols_done[row][col] = transformed[row];
        }
    }

    let mut out = vec![vec![0.0; width]; height];
    for row in 0..height {
        out[row] = idct1d(&cols_done[row]);
    }
    out
}

/// 1-D orthonormal DCT-II over `x`.
fn dct1d(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let n_f = n as f64;
    (0..n)
        .map(|k| {
            let sum: f64 = x
                .iter()
                .enumerate()
                .map(|(i, &xi)| xi * dct_basis(n_f, i, k))
                .sum();
            sum * dct_norm(n_f, k)
        })
        .collect()
}

/// 1-D orthonormal DCT-III (the inverse of [`dct1d`]).
fn idct1d(coeffs: &[f64]) -> Vec<f64> {
    let n = coeffs.len();
    if n == 0 {
        return Vec::new();
    }
    let n_f = n as f64;
    (0..n)
        .map(|i| {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &xk)| xk * dct_norm(n_f, k) * dct_basis(n_f, i, k))
                .sum()
        })
        .collect()
}

#[inline]
fn dct_basis(n: f64, i: usize, k: usize) -> f64 {
    (std::f64::consts::PI / n * (i as f64 + 0.5) * k as f64).cos()
}

#[inline]
fn dct_norm(n: f64, k: usize) -> f64 {
    if k == 0 {
        (1.0 / n).sqrt()
    } else {
        (2.0 / n).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(width: u32, height: u32, fill: u8) -> PixelBuffer {
        PixelBuffer::new(width, height, ChannelLayout::Rgb, vec![fill; (width * height * 3) as usize]).unwrap()
    }

    #[test]
    fn dct_idct_1d_roundtrips() {
        let x = vec![52.0, 55.0, 61.0, 66.0, 70.0, 61.0, 64.0, 73.0];
        let coeffs = dct1d(&x);
        let back = idct1d(&coeffs);
        for (a, b) in x.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn dct_idct_2d_roundtrips() {
        let plane = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![5.0, 6.0, 7.0, 8.0],
            vec![9.0, 10.0, 11.0, 12.0],
            vec![13.0, 14.0, 15.0, 16.0],
        ];
        let coeffs = dct2d(&plane, 4, 4);
        let back = idct2d(&coeffs, 4, 4);
        for row in 0..4 {
            for col in 0..4 {
                assert!((plane[row][col] - back[row][col]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn embed_requires_rgb() {
        let gray = PixelBuffer::new(8, 8, ChannelLayout::Gray, vec![0; 64]).unwrap();
        let err = DctEmbedder::embed(&gray, 1, "hi", 50).unwrap_err();
        assert!(matches!(err, WatermarkError::DctRequiresRgb));
    }

    #[test]
    fn embed_preserves_dimensions_and_is_subtle() {
        let image = rgb(128, 128, 128);
        let watermarked = DctEmbedder::embed(&image, 42, "hi", 50).unwrap();
        assert_eq!(watermarked.width(), image.width());
        assert_eq!(watermarked.height(), image.height());
        assert_eq!(watermarked.channels(), ChannelLayout::Rgb);

        let (y_before, _, _) = rgb_to_yuv(&image);
        let (y_after, _, _) = rgb_to_yuv(&watermarked);
        let mut total = 0.0;
        let mut count = 0.0;
        for row in 0..128 {
            for col in 0..128 {
                total += (y_before[row][col] - y_after[row][col]).abs();
                count += 1.0;
            }
        }
        assert!(total / count <= 3.0, "mean abs deviation was {}", total / count);
    }

    #[test]
    fn detect_correlates_with_embedded_pattern() {
        let image = rgb(128, 128, 128);
        let watermarked = DctEmbedder::embed(&image, 42, "hi", 50).unwrap();
        let result = DctEmbedder::detect(&watermarked, 42, "hi", 50).unwrap();
        assert!(result.detected, "correlation was {}", result.correlation);
    }

    #[test]
    fn detect_does_not_fire_on_wrong_secret() {
        let image = rgb(128, 128, 128);
        let watermarked = DctEmbedder::embed(&image, 42, "hi", 50).unwrap();
        let result = DctEmbedder::detect(&watermarked, 99, "hi", 50).unwrap();
        assert!(!result.detected, "correlation was {}", result.correlation);
    }
}
