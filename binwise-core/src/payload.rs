//! Decoding of base64 image payloads sent by clients.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};

use crate::ports::InputError;

const DATA_URL_MARKER: &str = ";base64,";

/// Image bytes together with the header information read from them.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw encoded image (PNG, JPEG, ...).
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Detected container format.
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Decode a base64 payload, optionally wrapped in a `data:` URL.
    ///
    /// Only the image header is parsed; pixel data stays encoded.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] for empty payloads, invalid base64 or unreadable images.
    pub fn from_base64(payload: &str) -> Result<Self, InputError> {
        let encoded = strip_data_url(payload.trim());
        if encoded.is_empty() {
            return Err(InputError::EmptyImage);
        }

        let bytes = STANDARD.decode(encoded)?;
        Self::from_bytes(bytes)
    }

    /// Inspect already-decoded image bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] when the format is unknown or the header is corrupt.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, InputError> {
        if bytes.is_empty() {
            return Err(InputError::EmptyImage);
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let format = reader.format().ok_or(InputError::UnknownImageFormat)?;
        let (width, height) = reader.into_dimensions()?;

        Ok(Self {
            bytes,
            width,
            height,
            format,
        })
    }

    /// Re-encode the raw bytes as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

fn strip_data_url(payload: &str) -> &str {
    if !payload.starts_with("data:") {
        return payload;
    }
    payload
        .split_once(DATA_URL_MARKER)
        .map_or(payload, |(_, encoded)| encoded)
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb([10_u8, 200, 30]));
        let mut out = Cursor::new(Vec::new());
        buffer
            .write_to(&mut out, ImageFormat::Png)
            .expect("png encoding");
        out.into_inner()
    }

    #[test]
    fn reads_dimensions_from_plain_base64() {
        let payload = STANDARD.encode(png(64, 32));
        let image = DecodedImage::from_base64(&payload).expect("valid payload");
        assert_eq!((image.width, image.height), (64, 32));
        assert_eq!(image.format, ImageFormat::Png);
    }

    #[test]
    fn accepts_data_urls() {
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(png(8, 16)));
        let image = DecodedImage::from_base64(&payload).expect("valid data url");
        assert_eq!((image.width, image.height), (8, 16));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(matches!(
            DecodedImage::from_base64("   "),
            Err(InputError::EmptyImage)
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            DecodedImage::from_base64("base64_encoded_image_data!"),
            Err(InputError::Base64(_))
        ));
    }

    #[test]
    fn rejects_bytes_that_are_not_an_image() {
        let payload = STANDARD.encode(b"definitely not an image");
        assert!(matches!(
            DecodedImage::from_base64(&payload),
            Err(InputError::UnknownImageFormat)
        ));
    }
}
