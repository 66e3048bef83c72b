//! Pixmap encoding

use std::io::Cursor;

use image::DynamicImage;

use crate::document::{DocumentError, DocumentResult};

/// Encode a MuPDF pixmap as PNG, returning the bytes and pixel size
pub fn encode_png(pixmap: &mupdf::Pixmap) -> DocumentResult<(Vec<u8>, u32, u32)> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let rgba = to_rgba(pixmap.samples(), width, height, pixmap.n() as usize);

    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| DocumentError::ImageError("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)?;

    Ok((output, width, height))
}

/// Expand packed samples with `n` components per pixel into RGBA
fn to_rgba(samples: &[u8], width: u32, height: u32, n: usize) -> Vec<u8> {
    let pixels = width as usize * height as usize;
    let mut rgba = Vec::with_capacity(pixels * 4);

    for p in 0..pixels {
        let offset = p * n;
        let r = samples.get(offset).copied().unwrap_or(0);
        let (g, b) = if n >= 3 {
            (
                samples.get(offset + 1).copied().unwrap_or(0),
                samples.get(offset + 2).copied().unwrap_or(0),
            )
        } else {
            // Gray
            (r, r)
        };
        let a = if n == 4 || n == 2 {
            samples.get(offset + n - 1).copied().unwrap_or(255)
        } else {
            255
        };
        rgba.extend_from_slice(&[r, g, b, a]);
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_rgba() {
        let samples = [10, 20, 30, 40, 50, 60];
        let rgba = to_rgba(&samples, 2, 1, 3);
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_rgba_passthrough() {
        let samples = [1, 2, 3, 128];
        assert_eq!(to_rgba(&samples, 1, 1, 4), vec![1, 2, 3, 128]);
    }

    #[test]
    fn test_gray_expands() {
        let samples = [77];
        assert_eq!(to_rgba(&samples, 1, 1, 1), vec![77, 77, 77, 255]);
    }

    #[test]
    fn test_short_buffer_pads_black() {
        let rgba = to_rgba(&[], 1, 1, 3);
        assert_eq!(rgba, vec![0, 0, 0, 255]);
    }
}
