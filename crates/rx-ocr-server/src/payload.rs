//! Checking that an upload is a decodable image before it reaches OCR.

use ::image::GenericImageView;
use tracing::debug;

use crate::ocr::{OcrError, OcrResult};

/// Image container formats the OCR engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageFormat {
    /// Identify the format from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'B', b'M', ..] => Some(Self::Bmp),
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some(Self::Tiff),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
        }
    }
}

/// An upload that decoded successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Cheap header check: reject payloads that cannot be an image.
pub fn validate_image(bytes: &[u8]) -> OcrResult<ImageFormat> {
    if bytes.is_empty() {
        return Err(OcrError::EmptyPayload);
    }
    ImageFormat::sniff(bytes).ok_or(OcrError::UnrecognizedImage)
}

/// Fully decode the payload.
///
/// A valid header over a corrupt or truncated body fails here.
pub fn decode_image(bytes: &[u8]) -> OcrResult<DecodedImage> {
    let format = validate_image(bytes)?;

    let decoded = ::image::load_from_memory(bytes).map_err(|e| {
        debug!(format = format.mime_type(), error = %e, "Failed to decode image");
        OcrError::UnrecognizedImage
    })?;
    let (width, height) = decoded.dimensions();

    Ok(DecodedImage {
        format,
        width,
        height,
    })
}
