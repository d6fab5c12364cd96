//! Placement of attachment files under the attachments root.
//!
//! Files are copied to `<root>/<documents|photos>/YYYY/MM/DD/<attachment id>.<ext>`,
//! dated by the upload day in local time. Records keep the path relative to
//! the root so a data directory can be moved as a whole.

use crate::error::{Result, StoreError};
use crate::paths;
use chrono::Datelike;
use prontuario_core::domain::{AttachmentId, AttachmentKind};
use prontuario_core::time::timestamp_local_date;
use std::fs;
use std::path::{Path, PathBuf};

pub fn relative_path(
    kind: AttachmentKind,
    id: AttachmentId,
    extension: &str,
    uploaded_at: i64,
) -> PathBuf {
    let date = timestamp_local_date(uploaded_at);
    PathBuf::from(kind.directory())
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
        .join(format!("{id}.{extension}"))
}

/// Copies `source` into place and returns the stored relative path.
pub fn store_file(root: &Path, source: &Path, relative: &Path) -> Result<String> {
    if !source.is_file() {
        return Err(StoreError::InvalidAttachmentSource(source.to_path_buf()));
    }
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        paths::ensure_private_dir(root)?;
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, &target)?;
    Ok(relative.to_string_lossy().replace('\\', "/"))
}

pub fn absolute_path(root: &Path, stored: &str) -> PathBuf {
    root.join(stored)
}

/// Removes a stored file. A file that is already gone is not an error.
pub fn remove_file(root: &Path, stored: &str) -> Result<()> {
    match fs::remove_file(absolute_path(root, stored)) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
