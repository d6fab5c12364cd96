use prontuario_core::{CoreError, Field, ValidationError, ValidationReason};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid id string: {0}")]
    InvalidId(String),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("invalid backup path (matches database): {0}")]
    InvalidBackupPath(PathBuf),
    #[error("backup failed integrity check: {0}")]
    CorruptBackup(PathBuf),
    #[error("attachment source is not a file: {0}")]
    InvalidAttachmentSource(PathBuf),
    #[error("cpf {0} is already registered for another patient")]
    DuplicateCpf(String),
    #[error("username already taken: {0}")]
    DuplicateUsername(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Core,
    MissingHomeDir,
    InvalidId,
    InvalidValue,
    NotFound,
    Migration,
    InvalidDataPath,
    InvalidBackupPath,
    CorruptBackup,
    InvalidAttachmentSource,
    DuplicateCpf,
    DuplicateUsername,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::InvalidId(_) => StoreErrorKind::InvalidId,
            StoreError::InvalidValue(_) => StoreErrorKind::InvalidValue,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::InvalidBackupPath(_) => StoreErrorKind::InvalidBackupPath,
            StoreError::CorruptBackup(_) => StoreErrorKind::CorruptBackup,
            StoreError::InvalidAttachmentSource(_) => StoreErrorKind::InvalidAttachmentSource,
            StoreError::DuplicateCpf(_) => StoreErrorKind::DuplicateCpf,
            StoreError::DuplicateUsername(_) => StoreErrorKind::DuplicateUsername,
        }
    }

    /// Field-level view of errors that describe a rejected field value.
    pub fn as_validation_error(&self) -> Option<ValidationError> {
        match self {
            StoreError::DuplicateCpf(_) => Some(ValidationError::new(
                Field::Cpf,
                ValidationReason::DuplicateId,
            )),
            StoreError::Core(CoreError::Validation(err)) => Some(*err),
            _ => None,
        }
    }
}
