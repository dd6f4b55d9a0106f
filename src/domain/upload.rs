//! Uploaded image types and intake validation.
//!
//! A selected file is probed from its metadata first (`FileHandle`) so that
//! oversized or non-image files are rejected before their contents are read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Largest accepted upload, inclusive (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// How the user handed the file over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeSource {
    /// Typed or browsed path, submitted explicitly
    Browse,
    /// Path dropped onto the terminal (bracketed paste)
    Drop,
}

/// Client-side validation failures. Each variant carries its own user message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("File size must be less than 5MB")]
    TooLarge { size: u64 },

    #[error("Please upload an image file")]
    NotAnImage { media_type: String },

    #[error("Please upload an image file (JPG, PNG)")]
    DroppedNonImage { media_type: String },

    #[error("Please upload an image before starting analysis")]
    MissingFile,

    #[error("Could not read the selected file")]
    Unreadable { reason: String },
}

/// Whether a declared media type denotes an image.
#[must_use]
pub fn is_image_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Validate a candidate file from its size and declared media type.
///
/// Drops are checked for the image type before anything else; selections
/// check size first.
///
/// # Errors
/// Returns the first failed check as an `IntakeError`.
pub fn validate_intake(
    size: u64,
    media_type: &str,
    source: IntakeSource,
) -> Result<(), IntakeError> {
    if source == IntakeSource::Drop && !is_image_type(media_type) {
        return Err(IntakeError::DroppedNonImage {
            media_type: media_type.to_string(),
        });
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(IntakeError::TooLarge { size });
    }

    if !is_image_type(media_type) {
        return Err(IntakeError::NotAnImage {
            media_type: media_type.to_string(),
        });
    }

    Ok(())
}

/// Declared media type for a path, derived from its extension.
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// A file on disk, described by metadata only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub media_type: String,
}

impl FileHandle {
    /// Probe a path without reading its contents.
    ///
    /// # Errors
    /// Returns `IntakeError::Unreadable` if the path is missing or not a file.
    pub fn probe(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| IntakeError::Unreadable {
            reason: e.to_string(),
        })?;

        if !meta.is_file() {
            return Err(IntakeError::Unreadable {
                reason: format!("{} is not a regular file", path.display()),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: meta.len(),
            media_type: media_type_for_path(path).to_string(),
        })
    }

    /// Read the file contents.
    ///
    /// # Errors
    /// Returns `IntakeError::Unreadable` on I/O failure.
    pub fn read(&self) -> Result<UploadedFile, IntakeError> {
        let bytes = std::fs::read(&self.path).map_err(|e| IntakeError::Unreadable {
            reason: e.to_string(),
        })?;
        Ok(UploadedFile::new(
            self.name.clone(),
            self.media_type.clone(),
            bytes,
        ))
    }
}

/// The image currently selected for analysis.
///
/// Contents are shared, so cloning into a payload or worker is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    bytes: Arc<[u8]>,
}

impl UploadedFile {
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Contents are omitted so image bytes never reach debug logs.
impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_boundary_is_inclusive() {
        assert!(validate_intake(MAX_UPLOAD_BYTES, "image/png", IntakeSource::Browse).is_ok());
        assert_eq!(
            validate_intake(MAX_UPLOAD_BYTES + 1, "image/png", IntakeSource::Browse),
            Err(IntakeError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1
            })
        );
    }

    #[test]
    fn test_selection_checks_size_before_type() {
        let err = validate_intake(6 * 1024 * 1024, "text/plain", IntakeSource::Browse)
            .expect_err("Should reject");
        assert!(matches!(err, IntakeError::TooLarge { .. }));
    }

    #[test]
    fn test_drop_checks_type_before_size() {
        let err = validate_intake(6 * 1024 * 1024, "text/plain", IntakeSource::Drop)
            .expect_err("Should reject");
        assert!(matches!(err, IntakeError::DroppedNonImage { .. }));
        assert_eq!(err.to_string(), "Please upload an image file (JPG, PNG)");
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(media_type_for_path(Path::new("a/b/lesion.JPG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("scan.png")), "image/png");
        assert_eq!(media_type_for_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            media_type_for_path(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_probe_reports_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mole.jpeg");
        std::fs::write(&path, vec![0u8; 2048]).expect("write");

        let handle = FileHandle::probe(&path).expect("Should probe");
        assert_eq!(handle.name, "mole.jpeg");
        assert_eq!(handle.size, 2048);
        assert_eq!(handle.media_type, "image/jpeg");

        let file = handle.read().expect("Should read");
        assert_eq!(file.size(), 2048);
    }

    #[test]
    fn test_probe_rejects_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FileHandle::probe(dir.path()).expect_err("Directory is not a file");
        assert!(matches!(err, IntakeError::Unreadable { .. }));
    }

    #[test]
    fn test_debug_hides_contents() {
        let file = UploadedFile::new("x.png", "image/png", vec![0xAB; 4]);
        let dbg = format!("{file:?}");
        assert!(dbg.contains("size: 4"));
        assert!(!dbg.contains("171"));
    }
}
