use crate::db;
use crate::error::{Result, StoreError};
use crate::{migrate, paths};
use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PAGES_PER_STEP: i32 = 128;
const STEP_PAUSE: Duration = Duration::from_millis(20);
const LIVE_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// What a finished snapshot contains, read back from the written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub schema_version: i64,
    pub patients: i64,
    pub attachments: i64,
}

/// Online snapshot of the open database, verified by reopening it read-only.
///
/// The target must not be the live database, one of its sidecar files, or a
/// hard link to it. Attachment files are not part of the snapshot.
pub fn backup_to(conn: &Connection, path: &Path) -> Result<BackupSummary> {
    paths::ensure_parent_dir(path)?;
    let target = resolve_target(path)?;
    if let Some(live) = live_database(conn) {
        if targets_live_database(&target, &resolve_target(&live)?)? {
            return Err(StoreError::InvalidBackupPath(path.to_path_buf()));
        }
    }

    {
        let mut dest = Connection::open(&target)?;
        let backup = Backup::new(conn, &mut dest)?;
        backup.run_to_completion(PAGES_PER_STEP, STEP_PAUSE, None)?;
        drop(backup);
        // Snapshots are standalone files without -wal/-shm companions.
        dest.pragma_update(None, "journal_mode", "DELETE")?;
    }
    db::restrict_db_permissions(&target)?;
    verify_snapshot(&target)
}

fn verify_snapshot(path: &Path) -> Result<BackupSummary> {
    let snapshot = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let check: String = snapshot.query_row("PRAGMA quick_check;", [], |row| row.get(0))?;
    if check != "ok" {
        return Err(StoreError::CorruptBackup(path.to_path_buf()));
    }

    let schema_version = migrate::schema_version(&snapshot)?;
    let (patients, attachments) = if schema_version > 0 {
        (
            count_rows(&snapshot, "patients")?,
            count_rows(&snapshot, "attachments")?,
        )
    } else {
        (0, 0)
    };

    Ok(BackupSummary {
        path: path.to_path_buf(),
        size_bytes: fs::metadata(path)?.len(),
        schema_version,
        patients,
        attachments,
    })
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table};");
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// File behind the `main` schema; `None` for in-memory databases.
fn live_database(conn: &Connection) -> Option<PathBuf> {
    conn.path()
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

/// Absolute form of `path`, resolving the parent when the file does not
/// exist yet.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(fs::canonicalize(path)?);
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::InvalidBackupPath(path.to_path_buf()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(file_name))
}

fn targets_live_database(target: &Path, live: &Path) -> Result<bool> {
    if target == live {
        return Ok(true);
    }
    let is_sidecar = LIVE_SUFFIXES.iter().any(|suffix| {
        let mut sidecar = live.as_os_str().to_owned();
        sidecar.push(suffix);
        target == Path::new(&sidecar)
    });
    if is_sidecar {
        return Ok(true);
    }
    same_inode(target, live)
}

#[cfg(unix)]
fn same_inode(a: &Path, b: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;
    if !a.exists() || !b.exists() {
        return Ok(false);
    }
    let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_inode(_a: &Path, _b: &Path) -> Result<bool> {
    Ok(false)
}
