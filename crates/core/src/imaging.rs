//! PNG normalization for processed images.
//!
//! The background-removal service returns whatever format its model
//! emits. Everything stored and zipped for training is normalized to PNG
//! so downstream consumers see one content type.

use std::io::Cursor;

use image::ImageFormat;

use crate::error::CoreError;

/// Content type of every normalized image.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Re-encode arbitrary image bytes as PNG.
///
/// Bytes that already decode as PNG are passed through unchanged to avoid
/// a lossy decode/encode cycle.
pub fn normalize_to_png(bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    if matches!(image::guess_format(bytes), Ok(ImageFormat::Png)) {
        return Ok(bytes.to_vec());
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("Unreadable image data: {e}")))?;

    let mut out = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;

    Ok(out)
}

/// Whether a multipart content type names an image payload.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10])))
    }

    #[test]
    fn png_input_passes_through() {
        let mut png = Vec::new();
        sample_image()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let out = normalize_to_png(&png).unwrap();
        assert_eq!(out, png);
    }

    #[test]
    fn jpeg_input_is_reencoded_as_png() {
        let mut jpeg = Vec::new();
        sample_image()
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let out = normalize_to_png(&jpeg).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(normalize_to_png(b"not an image").is_err());
    }

    #[test]
    fn image_content_types() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("image/jpeg"));
        assert!(!is_image_content_type("application/zip"));
        assert!(!is_image_content_type("text/plain"));
    }
}
