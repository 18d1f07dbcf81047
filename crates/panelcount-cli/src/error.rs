use anyhow::Error;
use panelcount_config::ConfigError;
use panelcount_core::CoreError;
use panelcount_sync::SyncError;
use std::io::ErrorKind;
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
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(sync_err) = cause.downcast_ref::<SyncError>() {
            return ExitCode::from(sync_exit_code(sync_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::MissingConfigFile(_) => EXIT_NOT_FOUND,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidTimeout(_)
        | ConfigError::EmptyDispatchField { .. }
        | ConfigError::InvalidCollectorName(_)
        | ConfigError::DuplicateCollectorName(_)
        | ConfigError::InvalidCollectorUrl { .. }
        | ConfigError::InvalidCollectorPath { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn sync_exit_code(err: &SyncError) -> u8 {
    match err {
        SyncError::Io(io_err) if io_err.kind() == ErrorKind::NotFound => EXIT_NOT_FOUND,
        SyncError::Io(_) => EXIT_FAILURE,
        SyncError::Unavailable(_) => EXIT_INVALID_INPUT,
        SyncError::UnsupportedFileType(_)
        | SyncError::Core(_)
        | SyncError::Parse(_)
        | SyncError::Csv(_)
        | SyncError::Spreadsheet(_) => EXIT_INVALID_INPUT,
        #[cfg(feature = "http")]
        SyncError::Http(_) => EXIT_FAILURE,
        #[cfg(feature = "http")]
        SyncError::Url(_) => EXIT_INVALID_INPUT,
    }
}
