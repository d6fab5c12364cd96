use anyhow::Error;
use prontuario_config::ConfigError;
use prontuario_core::{CoreError, FormErrors, LookupError, ValidationError};
use prontuario_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
    for cause in err.chain() {
        if let Some(form_errors) = cause.downcast_ref::<FormErrors>() {
            for field_error in form_errors.errors() {
                eprintln!("  {}", field_error);
            }
        }
        if let Some(field_error) = cause
            .downcast_ref::<StoreError>()
            .and_then(StoreError::as_validation_error)
        {
            eprintln!("  {}", field_error);
        }
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    ExitCode::from(exit_status_for(err))
}

fn exit_status_for(err: &Error) -> u8 {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            };
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return store_exit_code(store_err);
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return config_exit_code(config_err);
        }
        if let Some(lookup_err) = cause.downcast_ref::<LookupError>() {
            return lookup_exit_code(lookup_err);
        }
        if cause.downcast_ref::<FormErrors>().is_some()
            || cause.downcast_ref::<ValidationError>().is_some()
            || cause.downcast_ref::<CoreError>().is_some()
        {
            return EXIT_INVALID_INPUT;
        }
    }
    EXIT_FAILURE
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::InvalidId
        | StoreErrorKind::InvalidBackupPath
        | StoreErrorKind::InvalidDataPath
        | StoreErrorKind::InvalidAttachmentSource
        | StoreErrorKind::DuplicateCpf
        | StoreErrorKind::DuplicateUsername
        | StoreErrorKind::Core => EXIT_INVALID_INPUT,
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::InvalidValue
        | StoreErrorKind::Migration
        | StoreErrorKind::CorruptBackup
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidPractitioner(_)
        | ConfigError::InvalidBaseUrl(_)
        | ConfigError::InvalidTimeout(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn lookup_exit_code(err: &LookupError) -> u8 {
    match err {
        LookupError::Unavailable(_) | LookupError::Validation(_) => EXIT_INVALID_INPUT,
        LookupError::Request(_) | LookupError::Parse(_) => EXIT_FAILURE,
    }
}
