//! File payloads for resource writes.

use core::fmt;
use std::io;
use std::path::Path;

/// A file to upload as the new value of a resource.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name reported to the backend.
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Creates an upload from raw parts.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads `path`, inferring the content type from its extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            content_type: content_type_for(path).to_owned(),
            file_name,
            bytes,
        })
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload has no contents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Checks the content type against an accept pattern such as `image/*`.
    #[must_use]
    pub fn matches(&self, accept: &str) -> bool {
        match accept.strip_suffix('*') {
            Some(prefix) => self.content_type.starts_with(prefix),
            None => self.content_type == accept,
        }
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_patterns() {
        let png = Upload::new("a.png", "image/png", vec![1, 2, 3]);
        assert!(png.matches("image/*"));
        assert!(png.matches("image/png"));
        assert!(png.matches("*"));
        assert!(!png.matches("image/jpeg"));

        let pdf = Upload::new("a.pdf", "application/pdf", vec![]);
        assert!(!pdf.matches("image/*"));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("logo.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("logo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let path = std::env::temp_dir().join(format!("signet-upload-{}.png", std::process::id()));
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.len(), 4);
        assert!(upload.file_name.starts_with("signet-upload-"));
    }
}
