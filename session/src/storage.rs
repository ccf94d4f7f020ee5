//! Session files on disk.
//!
//! Writes go to a sibling temp file that is renamed over the target, so an
//! existing session is never left half-written.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{CodecError, SessionFile, decode_session, encode_session};

pub const DEFAULT_IMAGE_EXTENSION: &str = "png";
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mkv", "gif"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("unsupported {what} extension {ext:?}")]
    UnsupportedExtension { what: &'static str, ext: String },
    #[error("directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Check the extension metadata a session carries.
///
/// # Errors
///
/// Returns [`StorageError::UnsupportedExtension`] naming the first bad field.
pub fn validate(file: &SessionFile) -> Result<(), StorageError> {
    check_extension("image", &file.image_extension, IMAGE_EXTENSIONS)?;
    check_extension("video", &file.video_extension, VIDEO_EXTENSIONS)
}

fn check_extension(what: &'static str, ext: &str, allowed: &[&str]) -> Result<(), StorageError> {
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)) {
        Ok(())
    } else {
        Err(StorageError::UnsupportedExtension { what, ext: ext.to_owned() })
    }
}

/// Encode and write `file` to `path`.
///
/// # Errors
///
/// Fails before touching the disk if the parent directory is missing or the
/// extension metadata is unsupported; otherwise on encode or I/O failure.
pub fn save_to_path(path: &Path, file: &SessionFile) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(StorageError::MissingDirectory(dir.to_path_buf()));
    }
    validate(file)?;
    let bytes = encode_session(file)?;

    let tmp = temp_sibling(path);
    if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path)) {
        warn!(path = %path.display(), error = %e, "session write failed");
        if let Err(cleanup) = fs::remove_file(&tmp) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %cleanup, "temp file left behind");
            }
        }
        return Err(StorageError::io(path, e));
    }
    info!(path = %path.display(), bytes = bytes.len(), annotations = file.store.total(), "session saved");
    Ok(())
}

/// Read and decode the session at `path`.
///
/// # Errors
///
/// Returns [`StorageError::Io`] when the file cannot be read and
/// [`StorageError::Codec`] when it is not a valid session.
pub fn load_from_path(path: &Path) -> Result<SessionFile, StorageError> {
    let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    let file = decode_session(&bytes).inspect_err(|e| {
        warn!(path = %path.display(), error = %e, "session load failed");
    })?;
    info!(path = %path.display(), annotations = file.store.total(), "session loaded");
    Ok(file)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
