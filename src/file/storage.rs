//! Image upload storage for eduboard.
//!
//! Uploaded pictures are stored per course:
//! ```text
//! {base_path}/
//! ├── 0b9d…-course-id/
//! │   ├── 1718000000000_0.png
//! │   └── 1718000000000_1.jpg
//! └── …
//! ```
//! and addressed by clients as `{public_prefix}/{course_id}/{file}`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::db::CourseId;

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Upload errors.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The bytes are not a recognised image format.
    #[error("unsupported file type: only png, jpeg, gif, webp and bmp images are accepted")]
    UnsupportedType,

    /// The file exceeds the configured size limit.
    #[error("file too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size of the rejected file.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// The requested file name would escape the course directory.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Stores a file for a course and returns the URI clients use to fetch it.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Store `bytes` as `filename` under `course_id`.
    ///
    /// `filename` carries no extension; the implementation picks one.
    async fn upload(
        &self,
        bytes: &[u8],
        course_id: &CourseId,
        filename: &str,
    ) -> Result<String, UploadError>;
}

/// Detect the image format from its leading bytes.
///
/// Returns the canonical file extension, or `None` for anything that is not
/// one of the accepted image formats.
pub fn sniff_image_extension(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    let ext = if bytes.starts_with(PNG) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
        "bmp"
    } else {
        return None;
    };

    // Only extensions that map to image/* pass.
    let mime = mime_guess::from_ext(ext).first_or_octet_stream();
    (mime.type_() == mime_guess::mime::IMAGE).then_some(ext)
}

/// Uploader that writes images to the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskUploader {
    /// Base directory for uploads.
    base_path: PathBuf,
    /// URL prefix the base directory is served under.
    public_prefix: String,
    /// Maximum accepted file size in bytes.
    max_size: u64,
}

impl DiskUploader {
    /// Create a new uploader rooted at `base_path`.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>, public_prefix: impl Into<String>) -> io::Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Ok(Self {
            base_path,
            public_prefix,
            max_size: DEFAULT_MAX_UPLOAD_SIZE,
        })
    }

    /// Set the maximum accepted file size.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the full path a file for a course would be stored at.
    pub fn file_path(&self, course_id: &CourseId, stored_name: &str) -> PathBuf {
        self.base_path.join(course_id.to_string()).join(stored_name)
    }

    fn check_name(filename: &str) -> Result<(), UploadError> {
        let bad = filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename.starts_with('.')
            || filename.chars().any(|c| c.is_control());
        if bad {
            return Err(UploadError::InvalidName(filename.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Uploader for DiskUploader {
    async fn upload(
        &self,
        bytes: &[u8],
        course_id: &CourseId,
        filename: &str,
    ) -> Result<String, UploadError> {
        Self::check_name(filename)?;

        let size = bytes.len() as u64;
        if size > self.max_size {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_size,
            });
        }

        let ext = sniff_image_extension(bytes).ok_or(UploadError::UnsupportedType)?;
        let stored_name = format!("{filename}.{ext}");
        let path = self.file_path(course_id, &stored_name);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size, "Stored upload");
        Ok(format!("{}/{}/{}", self.public_prefix, course_id, stored_name))
    }
}
