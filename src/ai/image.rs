//! Data-URI image payloads.
//!
//! Callers hand images over as `data:<mime>;base64,<payload>` strings. Gemini
//! only wants the payload, and every image is sent tagged as JPEG.

use super::gemini::types::{InlineData, Part};
use super::mime::detect_image_mime;
use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Everything after the first comma. A string without a comma is taken to be
/// a bare base64 payload already.
pub fn data_uri_payload(image: &str) -> &str {
    match image.split_once(',') {
        Some((_, payload)) => payload,
        None => image,
    }
}

/// Inline JPEG part for one data-URI image.
pub fn image_part(image: &str) -> Part {
    Part::InlineData {
        inline_data: InlineData {
            mime_type: IMAGE_MIME_TYPE.to_string(),
            data: data_uri_payload(image).to_string(),
        },
    }
}

/// Encodes raw image bytes as a base64 data URI.
pub fn to_data_uri(bytes: &[u8]) -> Result<String> {
    let mime = detect_image_mime(bytes)
        .ok_or_else(|| Error::InvalidImage("unrecognized image format".to_string()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", mime, encoded))
}

/// Reads an image file into a data URI.
pub fn read_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    tracing::debug!("Read image {} ({} bytes)", path.display(), bytes.len());

    to_data_uri(&bytes)
        .map_err(|e| Error::InvalidImage(format!("{}: {}", path.display(), e)))
}
