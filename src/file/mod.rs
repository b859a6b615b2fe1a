//! File upload module for eduboard.
//!
//! Course entry pictures are handed to an [`Uploader`], which stores them
//! and returns the URI clients fetch them from.

mod storage;

pub use storage::{
    sniff_image_extension, DiskUploader, UploadError, Uploader, DEFAULT_MAX_UPLOAD_SIZE,
};
