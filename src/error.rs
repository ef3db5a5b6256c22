/*
 * Error types for the setup side of framelessui. The message path never returns
 * these: every OS query made while routing a message degrades to a default
 * instead. Errors only surface from window class registration, window creation
 * and configuration validation.
 */
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FramelessError {
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(target_os = "windows")]
    #[error("Win32 error: {0}")]
    Win32(#[from] windows::core::Error),
}

pub type Result<T> = std::result::Result<T, FramelessError>;
