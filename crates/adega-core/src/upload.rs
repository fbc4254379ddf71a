//! # Product Image Checks
//!
//! Uploads are rejected before anything touches storage:
//!
//! ```text
//! declared type ∈ {jpeg, png, webp, gif}?  ── no ──► InvalidImage
//!          │
//! size in 1..=5 MB?                         ── no ──► InvalidImage
//!          │
//! magic bytes match declared type?         ── no ──► InvalidImage
//!          │
//!          ▼
//!     ImageKind (file extension for the stored object)
//! ```

use crate::error::{CoreError, CoreResult};
use crate::MAX_IMAGE_BYTES;

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Detects the format from the file signature.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else {
            None
        }
    }

    pub const fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
            ImageKind::Gif => "image/gif",
        }
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
            ImageKind::Gif => "gif",
        }
    }
}

fn rejected(reason: impl Into<String>) -> CoreError {
    CoreError::InvalidImage {
        reason: reason.into(),
    }
}

/// Checks declared type, size and signature of an uploaded image.
pub fn validate_image(declared_mime: &str, data: &[u8]) -> CoreResult<ImageKind> {
    let kind = ImageKind::from_mime(declared_mime).ok_or_else(|| {
        rejected(format!(
            "unsupported type '{declared_mime}', allowed: jpeg, png, webp, gif"
        ))
    })?;

    if data.is_empty() {
        return Err(rejected("empty file"));
    }

    if data.len() > MAX_IMAGE_BYTES {
        return Err(rejected(format!(
            "file too large ({} bytes), maximum is {}MB",
            data.len(),
            MAX_IMAGE_BYTES / 1024 / 1024
        )));
    }

    match ImageKind::sniff(data) {
        Some(actual) if actual == kind => Ok(kind),
        _ => Err(rejected(format!("content is not a valid {}", kind.mime()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_accepts_allowed_types() {
        assert_eq!(validate_image("image/png", PNG).unwrap(), ImageKind::Png);
        assert_eq!(
            validate_image("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap(),
            ImageKind::Jpeg
        );
        assert_eq!(validate_image("image/gif", b"GIF89a...").unwrap(), ImageKind::Gif);
        assert_eq!(
            validate_image("image/webp", b"RIFF\0\0\0\0WEBPVP8 ").unwrap(),
            ImageKind::Webp
        );
    }

    #[test]
    fn test_rejects_other_types() {
        assert!(validate_image("image/svg+xml", b"<svg/>").is_err());
        assert!(validate_image("application/pdf", b"%PDF").is_err());
    }

    #[test]
    fn test_rejects_oversized() {
        let mut data = PNG.to_vec();
        data.resize(MAX_IMAGE_BYTES + 1, 0);
        let err = validate_image("image/png", &data).unwrap_err();
        assert!(err.to_string().contains("too large"));

        data.truncate(MAX_IMAGE_BYTES);
        assert!(validate_image("image/png", &data).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_content() {
        assert!(validate_image("image/jpeg", PNG).is_err());
        assert!(validate_image("image/png", b"").is_err());
    }

    #[test]
    fn test_mime_parameters_ignored() {
        assert_eq!(ImageKind::from_mime("IMAGE/PNG; charset=binary"), Some(ImageKind::Png));
    }
}
