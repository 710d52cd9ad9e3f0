//! Centralized error types for the filter
//!
//! All errors are represented by the `BridgeError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, BridgeError>`.

use std::fmt;
use std::path::PathBuf;

/// All filter errors
#[derive(Debug)]
pub enum BridgeError {
    // === Serial ===
    /// Failed to open serial port
    SerialOpen {
        port: String,
        source: std::io::Error,
    },
    /// Read or write on the serial line failed
    SerialIo { source: std::io::Error },

    // === Config ===
    /// Failed to read the options file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Options file is not valid JSON/TOML for the expected shape
    ConfigParse { path: PathBuf, reason: String },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },
    /// Device identifier not in `NN:NNNNNN` form
    InvalidDeviceId { value: String },

    // === Runtime ===
    /// Tokio runtime creation failed
    Runtime { source: std::io::Error },
}

impl BridgeError {
    /// Process exit status for a fatal startup error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::InvalidDeviceId { .. } => 2,
            Self::SerialOpen { .. } | Self::SerialIo { .. } => 3,
            Self::Runtime { .. } => 4,
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SerialOpen { source, .. }
            | Self::SerialIo { source }
            | Self::ConfigRead { source, .. }
            | Self::Runtime { source } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SerialOpen { port, source } => {
                write!(f, "Cannot open serial port {}: {}", port, source)
            }
            Self::SerialIo { source } => write!(f, "Serial I/O error: {}", source),
            Self::ConfigRead { path, source } => {
                write!(f, "Cannot read options {}: {}", path.display(), source)
            }
            Self::ConfigParse { path, reason } => {
                write!(f, "Invalid options file {}: {}", path.display(), reason)
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::InvalidDeviceId { value } => {
                write!(f, "Invalid device id '{}' (expected NN:NNNNNN)", value)
            }
            Self::Runtime { .. } => write!(f, "Failed to create runtime"),
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(source: std::io::Error) -> Self {
        Self::SerialIo { source }
    }
}

/// Alias for Result with BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinguish_startup_failures() {
        let config = BridgeError::ConfigValidation {
            field: "max_ch_raw",
            reason: "out of range".into(),
        };
        let serial = BridgeError::SerialOpen {
            port: "/dev/ttyUSB0".into(),
            source: std::io::Error::other("missing"),
        };
        let id = BridgeError::InvalidDeviceId {
            value: "01-123".into(),
        };

        assert_eq!(config.exit_code(), 2);
        assert_eq!(id.exit_code(), 2);
        assert_eq!(serial.exit_code(), 3);
        assert_ne!(config.exit_code(), 0);
    }

    #[test]
    fn test_display_device_id() {
        let err = BridgeError::InvalidDeviceId {
            value: "bogus".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid device id 'bogus' (expected NN:NNNNNN)"
        );
    }

    #[test]
    fn test_io_error_converts_to_serial_io() {
        let err: BridgeError = std::io::Error::other("boom").into();
        assert!(matches!(err, BridgeError::SerialIo { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
