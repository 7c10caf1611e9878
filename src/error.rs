//! # Error Types
//!
//! This module defines the error taxonomy used throughout the struk library.
//!
//! The first six variants are the failure categories a caller is expected to
//! branch on (setup guidance vs. enable prompt vs. plain retry). The rest
//! wrap internal concerns (image decoding, settings storage, raw I/O).

use thiserror::Error;

/// Main error type for struk operations
#[derive(Debug, Error)]
pub enum PrintError {
    /// No usable Bluetooth stack on this host (bluetoothctl/rfcomm missing).
    /// Not retryable; the message carries setup guidance.
    #[error("Bluetooth module unavailable: {0}")]
    ModuleUnavailable(String),

    /// The OS refused access to the radio or the RFCOMM device.
    /// Not retryable until the user grants access.
    #[error("Bluetooth permission denied: {0}")]
    PermissionDenied(String),

    /// The adapter is powered off and could not be enabled.
    #[error("Bluetooth adapter disabled: {0}")]
    AdapterDisabled(String),

    /// The requested address is not among the bonded devices.
    #[error("Printer not found: {0}")]
    DeviceNotFound(String),

    /// RFCOMM handshake failed (already retried once internally).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A chunk write failed mid-job. The whole print is considered failed;
    /// there is no partial-success state.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Logo decode/resize/pack error. Callers printing a receipt catch this
    /// and print without the logo.
    #[error("Image error: {0}")]
    Image(String),

    /// Receipt data violates an invariant (zero quantity, negative price).
    #[error("Invalid receipt: {0}")]
    InvalidReceipt(String),

    /// Settings store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    /// Whether retrying the same operation can succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PrintError::ConnectionFailed(_) | PrintError::WriteFailed(_) | PrintError::Io(_)
        )
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
