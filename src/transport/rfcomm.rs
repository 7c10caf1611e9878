//! # RFCOMM Connector
//!
//! Opens the serial channel to a bonded printer over Bluetooth Classic
//! (RFCOMM/SPP). On Linux an RFCOMM binding exposes the channel as
//! `/dev/rfcommN`; this connector finds an existing binding for the target
//! address or creates one, then opens the device in raw TTY mode so binary
//! command data passes through unmodified.
//!
//! ## Raw TTY mode
//!
//! The kernel's default line discipline would translate line endings and
//! interpret XON/XOFF (0x11/0x13) — bytes that legitimately appear inside
//! raster data. Everything is disabled: input processing, output
//! post-processing, echo, canonical mode, software flow control; 8-bit
//! characters, no parity.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{PrintError, PrintResult};
use crate::transport::{Connector, PairedDevice, Transport, adapter};

/// RFCOMM channel indices probed when creating a fresh binding.
const BIND_CHANNELS: std::ops::Range<u8> = 0..4;

/// Wait for `/dev/rfcommN` to appear after a bind.
const BIND_SETTLE: Duration = Duration::from_millis(500);

/// Validate a Bluetooth hardware address (XX:XX:XX:XX:XX:XX).
pub fn is_valid_address(address: &str) -> bool {
    let parts: Vec<&str> = address.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Scan the kernel's RFCOMM table for a device already bound to `address`.
///
/// `/proc/net/rfcomm` lines look like `rfcomm0: 66:22:D4:2A:0F:91 channel 1 ...`.
fn device_in_table(table: &str, address: &str) -> Option<String> {
    let needle = address.to_uppercase();
    for line in table.lines() {
        if line.to_uppercase().contains(&needle) {
            if let Some(dev) = line.split(':').next() {
                return Some(format!("/dev/{}", dev.trim()));
            }
        }
    }
    None
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// An open RFCOMM device file.
pub struct RfcommTransport {
    file: File,
    device: String,
}

impl Transport for RfcommTransport {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        debug!(device = %self.device, "closing rfcomm transport");
        self.file.flush()
    }
}

// ============================================================================
// CONNECTOR
// ============================================================================

/// Production [`Connector`]: bonded devices via [`adapter`], channels via
/// `/dev/rfcommN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RfcommConnector;

impl RfcommConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for RfcommConnector {
    fn paired_devices(&self) -> PrintResult<Vec<PairedDevice>> {
        adapter::paired_devices()
    }

    fn open(&self, address: &str) -> PrintResult<Box<dyn Transport>> {
        if !is_valid_address(address) {
            return Err(PrintError::DeviceNotFound(format!(
                "not a Bluetooth address: {address}"
            )));
        }

        let device = match find_bound_device(address)? {
            Some(dev) => dev,
            None => bind_device(address)?,
        };
        info!(address, device = %device, "opening rfcomm channel");

        let file = OpenOptions::new().write(true).open(&device).map_err(|e| {
            match e.kind() {
                io::ErrorKind::PermissionDenied => PrintError::PermissionDenied(format!(
                    "cannot open {device}: {e} (add your user to the dialout group)"
                )),
                _ => PrintError::ConnectionFailed(format!("failed to open {device}: {e}")),
            }
        })?;

        configure_tty_raw(&file)?;

        Ok(Box::new(RfcommTransport {
            file,
            device,
        }))
    }
}

/// Locate an existing RFCOMM binding for `address`, if any.
fn find_bound_device(address: &str) -> PrintResult<Option<String>> {
    let Ok(table) = fs::read_to_string("/proc/net/rfcomm") else {
        return Ok(None);
    };
    match device_in_table(&table, address) {
        Some(dev) if Path::new(&dev).exists() => Ok(Some(dev)),
        _ => Ok(None),
    }
}

/// Create an RFCOMM binding for `address` on the first free channel.
///
/// Runs `rfcomm bind N <address> 1` (RFCOMM channel 1 is standard for SPP).
/// Requires the rfcomm utility and the privilege to bind.
fn bind_device(address: &str) -> PrintResult<String> {
    let mut last_err = String::new();

    for n in BIND_CHANNELS {
        let device = format!("/dev/rfcomm{n}");
        if Path::new(&device).exists() {
            continue; // channel taken by another binding
        }

        let output = Command::new("rfcomm")
            .args(["bind", &n.to_string(), address, "1"])
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => PrintError::ModuleUnavailable(
                    "rfcomm tool not found; install the BlueZ utilities and \
                     bind the printer to /dev/rfcommN"
                        .into(),
                ),
                io::ErrorKind::PermissionDenied => {
                    PrintError::PermissionDenied(format!("cannot run rfcomm: {e}"))
                }
                _ => PrintError::Io(e),
            })?;

        if output.status.success() {
            thread::sleep(BIND_SETTLE);
            if Path::new(&device).exists() {
                info!(address, device = %device, "bound rfcomm channel");
                return Ok(device);
            }
            last_err = format!("{device} did not appear after bind");
        } else {
            last_err = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if last_err.contains("Operation not permitted")
                || last_err.contains("Permission denied")
            {
                return Err(PrintError::PermissionDenied(format!(
                    "rfcomm bind refused: {last_err} (binding needs CAP_NET_ADMIN)"
                )));
            }
        }
    }

    Err(PrintError::ConnectionFailed(format!(
        "could not bind an rfcomm channel for {address}: {last_err}"
    )))
}

// ============================================================================
// TTY CONFIGURATION
// ============================================================================

#[cfg(unix)]
fn configure_tty_raw(file: &File) -> PrintResult<()> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(PrintError::ConnectionFailed(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    // No input translation, no XON/XOFF (0x11/0x13 occur in raster data)
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    // No output post-processing (CR/LF translation would corrupt commands)
    termios.c_oflag &= !libc::OPOST;
    // No echo, no canonical line buffering, no signal characters
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    // 8 data bits, no parity
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(PrintError::ConnectionFailed(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File) -> PrintResult<()> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
