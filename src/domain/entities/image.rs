//! Domain types for remote images and the local handles that stand in for them.

use bytes::Bytes;

/// Fallback MIME type when neither the server nor the bytes say otherwise.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Unique identifier for a source image.
/// Generated from a hash of the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an `ImageId` from a URL by hashing it.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locally resolvable handle usable as an image source.
///
/// Two handles are the same resource exactly when they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    /// Wraps an already formatted handle string.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the filesystem path for `file://` handles.
    #[must_use]
    pub fn to_file_path(&self) -> Option<std::path::PathBuf> {
        self.0.strip_prefix("file://").map(std::path::PathBuf::from)
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a successful image fetch.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// URL the bytes were fetched from.
    pub source: String,
    /// Raw response body.
    pub bytes: Bytes,
    /// `Content-Type` header as sent by the server.
    pub content_type: Option<String>,
}

impl ImagePayload {
    /// Creates a payload without a declared content type.
    #[must_use]
    pub fn new(source: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            source: source.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Resolves the MIME type: declared header first, then byte sniffing.
    #[must_use]
    pub fn mime_type(&self) -> String {
        if let Some(declared) = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
        {
            return declared.to_ascii_lowercase();
        }

        ::image::guess_format(&self.bytes).map_or_else(
            |_| OCTET_STREAM.to_string(),
            |format| format.to_mime_type().to_string(),
        )
    }
}

/// Maps a MIME type to the file extension used for stored blobs.
#[must_use]
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/png" => "png",
        _ => "bin",
    }
}

/// Where a load result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Already present in the cache.
    Cache,
    /// Shared the result of a fetch another caller started.
    InFlight,
    /// This call started the network fetch.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::InFlight => write!(f, "in-flight"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A resolved image handle together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Source URL that was requested.
    pub url: String,
    /// Local handle for the image.
    pub handle: ObjectUrl,
    /// How the handle was obtained.
    pub source: ImageSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_image_id_from_url() {
        let url = "https://cdn.example/avatar1.png";
        let id = ImageId::from_url(url);
        assert_eq!(id.as_str().len(), 32);
        assert_eq!(id, ImageId::from_url(url));
        assert_ne!(id, ImageId::from_url("https://cdn.example/avatar2.png"));
    }

    #[test]
    fn test_declared_content_type_wins() {
        let payload =
            ImagePayload::new("u", PNG_MAGIC.to_vec()).with_content_type("Image/JPEG; charset=x");
        assert_eq!(payload.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_sniffs_when_undeclared() {
        let payload = ImagePayload::new("u", PNG_MAGIC.to_vec());
        assert_eq!(payload.mime_type(), "image/png");
    }

    #[test]
    fn test_unknown_bytes_fall_back() {
        let payload = ImagePayload::new("u", b"not an image".to_vec()).with_content_type("  ");
        assert_eq!(payload.mime_type(), OCTET_STREAM);
    }

    #[test_case("image/jpeg", "jpg" ; "jpeg")]
    #[test_case("image/png", "png" ; "png")]
    #[test_case("image/webp", "webp" ; "webp")]
    #[test_case("image/svg+xml", "svg" ; "svg")]
    #[test_case("text/html", "bin" ; "unknown")]
    fn test_extension_for_mime(mime: &str, expected: &str) {
        assert_eq!(extension_for_mime(mime), expected);
    }

    #[test]
    fn test_file_path_only_for_file_handles() {
        let file = ObjectUrl::new("file:///tmp/x.png");
        assert_eq!(
            file.to_file_path(),
            Some(std::path::PathBuf::from("/tmp/x.png"))
        );
        assert!(ObjectUrl::new("blob:baltek/1").to_file_path().is_none());
    }
}
