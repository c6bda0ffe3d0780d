//! Error types for hotspotctl

use crate::tethering::TetheringCapability;
use std::io;
use thiserror::Error;

/// Failures reported by the platform tethering binding.
///
/// These are surfaced to callers unchanged; the controller never retries
/// or downgrades them.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// IO error while talking to the platform
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Platform command exited unsuccessfully
    #[error("Command '{cmd}' failed{}: {stderr}", exit_code_suffix(.code))]
    CommandFailed {
        cmd: String,
        code: Option<i32>,
        stderr: String,
    },
    /// Platform rejected the request
    #[error("Rejected by platform: {0}")]
    Rejected(String),
    /// Operation is not available on this platform
    #[error("Not supported: {0}")]
    NotSupported(String),
    /// Platform output could not be understood
    #[error("Parse error: {0}")]
    Parse(String),
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with code {}", code),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum HotspotError {
    /// Tethering is not available for the active connection
    #[error("Tethering is unsupported on this device: {0}")]
    Capability(TetheringCapability),
    /// No internet connection profile is active, so there is nothing to share
    #[error("No active internet connection to share")]
    NoInternetConnection,
    /// Caller-supplied configuration value is out of bounds
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// Caller contract violation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Underlying platform failure
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<io::Error> for HotspotError {
    fn from(error: io::Error) -> Self {
        HotspotError::Platform(PlatformError::Io(error))
    }
}

impl From<serde_json::Error> for HotspotError {
    fn from(error: serde_json::Error) -> Self {
        HotspotError::Config(error.to_string())
    }
}

pub type HotspotResult<T> = Result<T, HotspotError>;
pub type PlatformResult<T> = Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = PlatformError::CommandFailed {
            cmd: "nmcli connection up Hotspot".to_string(),
            code: Some(4),
            stderr: "activation failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'nmcli connection up Hotspot' failed with code 4: activation failed"
        );

        let err = PlatformError::CommandFailed {
            cmd: "ip neigh".to_string(),
            code: None,
            stderr: "killed".to_string(),
        };
        assert_eq!(err.to_string(), "Command 'ip neigh' failed: killed");
    }

    #[test]
    fn test_platform_error_is_transparent() {
        let err: HotspotError = PlatformError::Rejected("busy".to_string()).into();
        assert_eq!(err.to_string(), "Rejected by platform: busy");
        assert!(matches!(err, HotspotError::Platform(PlatformError::Rejected(_))));
    }

    #[test]
    fn test_capability_message() {
        let err = HotspotError::Capability(TetheringCapability::DisabledByHardwareLimitation);
        assert_eq!(
            err.to_string(),
            "Tethering is unsupported on this device: disabled by hardware limitation"
        );
    }
}
