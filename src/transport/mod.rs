//! # Transport
//!
//! Bluetooth Classic (RFCOMM/SPP) plumbing: bonded-device enumeration
//! ([`adapter`]), the RFCOMM device connector ([`rfcomm`]), and the
//! connection manager that owns the single active session and performs
//! paced, size-bounded writes ([`manager`]).
//!
//! The seams are two small traits: [`Connector`] opens a byte channel to an
//! address and knows which peripherals are bonded; [`Transport`] is the open
//! channel. Production code wires in [`rfcomm::RfcommConnector`]; tests wire
//! in mocks.

pub mod adapter;
pub mod manager;
pub mod rfcomm;

pub use manager::{ConnectionManager, LinkState};
pub use rfcomm::RfcommConnector;

use std::io;

use crate::error::PrintResult;

/// A bonded peripheral: display name (may be absent) and the hardware
/// address that serves as its sole key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedDevice {
    pub name: Option<String>,
    pub address: String,
}

impl PairedDevice {
    /// Display name with the standard fallback.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Device")
    }
}

/// An open byte channel to a printer.
///
/// The manager writes pre-chunked slices; implementations just move bytes.
pub trait Transport: Send {
    /// Write one chunk, completely.
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Flush any buffered bytes to the device.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Tear the channel down. Called on disconnect and on supersede;
    /// failures are ignored by the caller.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Opens transports and enumerates bonded peripherals.
pub trait Connector: Send {
    /// List bonded peripherals. Checks radio availability, permissions and
    /// adapter power state along the way, surfacing the typed errors.
    fn paired_devices(&self) -> PrintResult<Vec<PairedDevice>>;

    /// Open a fresh channel to `address`.
    fn open(&self, address: &str) -> PrintResult<Box<dyn Transport>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let named = PairedDevice {
            name: Some("RPP02N".into()),
            address: "66:22:D4:2A:0F:91".into(),
        };
        assert_eq!(named.display_name(), "RPP02N");

        let unnamed = PairedDevice {
            name: None,
            address: "66:22:D4:2A:0F:91".into(),
        };
        assert_eq!(unnamed.display_name(), "Unknown Device");
    }
}
