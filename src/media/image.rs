//! The active source image.
//!
//! Exactly one image is active per session; replacing it invalidates every
//! derived result. The payload is reference-counted so each upload request
//! can take a cheap clone without copying the bytes until the multipart
//! body is built.

use std::path::Path;
use std::sync::Arc;

/// An image loaded by the user, ready for upload.
#[derive(Clone)]
pub struct SourceImage {
    bytes: Arc<Vec<u8>>,
    content_type: String,
    file_name: String,
}

impl SourceImage {
    pub fn new(
        bytes: Vec<u8>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            bytes: Arc::new(bytes),
            content_type: content_type.into(),
            file_name: file_name.into(),
        }
    }

    /// Read an image from disk, inferring the content type from the file
    /// extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let content_type = Self::content_type_for(path).to_string();
        Ok(Self {
            bytes: Arc::new(bytes),
            content_type,
            file_name,
        })
    }

    /// Map a file extension to the MIME type sent with the upload.
    ///
    /// Unknown extensions fall through to `application/octet-stream`, which
    /// the backend rejects as a non-image.
    pub fn content_type_for(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("bmp") => "image/bmp",
            Some("tif") | Some("tiff") => "image/tiff",
            _ => "application/octet-stream",
        }
    }

    /// Whether the inferred content type is one the backend will accept.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Owned copy of the payload for a multipart body.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.as_ref().clone()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn content_type_from_extension() {
        assert_eq!(
            SourceImage::content_type_for(&PathBuf::from("photo.JPG")),
            "image/jpeg"
        );
        assert_eq!(
            SourceImage::content_type_for(&PathBuf::from("scan.png")),
            "image/png"
        );
        assert_eq!(
            SourceImage::content_type_for(&PathBuf::from("anim.webp")),
            "image/webp"
        );
        assert_eq!(
            SourceImage::content_type_for(&PathBuf::from("notes.txt")),
            "application/octet-stream"
        );
        assert_eq!(
            SourceImage::content_type_for(&PathBuf::from("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn accessors_expose_payload() {
        let img = SourceImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg", "photo.jpg");
        assert_eq!(img.bytes(), &[0xFF, 0xD8, 0xFF]);
        assert_eq!(img.to_vec(), vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(img.content_type(), "image/jpeg");
        assert_eq!(img.file_name(), "photo.jpg");
        assert_eq!(img.len(), 3);
        assert!(!img.is_empty());
        assert!(img.is_image());
    }

    #[test]
    fn clones_share_the_payload() {
        let img = SourceImage::new(vec![1; 1024], "image/png", "big.png");
        let clone = img.clone();
        assert!(std::ptr::eq(img.bytes().as_ptr(), clone.bytes().as_ptr()));
    }

    #[test]
    fn non_image_content_type_is_flagged() {
        let img = SourceImage::new(vec![1], "application/octet-stream", "blob");
        assert!(!img.is_image());
    }
}
