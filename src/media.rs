//! Local media inspection

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Description of a local audio file about to be uploaded
///
/// Derived once per pipeline run from filesystem metadata and discarded
/// after the upload completes.
#[derive(Debug, Clone)]
pub struct MediaDescriptor {
    /// Path to the local file
    pub path: PathBuf,
    /// Inferred or explicitly supplied content type
    pub mime_type: String,
    /// File size in bytes
    pub byte_length: u64,
}

impl MediaDescriptor {
    /// Inspect a local file, inferring its content type from the extension
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist and
    /// [`Error::UnknownMediaType`] if no content type can be inferred —
    /// the caller must then supply one via [`Self::with_mime_type`] or abort.
    pub fn from_path(path: &Path) -> Result<Self> {
        let byte_length = file_length(path)?;
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .ok_or_else(|| Error::UnknownMediaType(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
            byte_length,
        })
    }

    /// Inspect a local file with an explicitly supplied content type
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist
    pub fn with_mime_type(path: &Path, mime_type: &str) -> Result<Self> {
        let byte_length = file_length(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
            byte_length,
        })
    }
}

/// Stat a local file, mapping a missing entry to [`Error::NotFound`]
fn file_length(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.display().to_string())
        } else {
            Error::Io(e)
        }
    })?;
    Ok(metadata.len())
}
