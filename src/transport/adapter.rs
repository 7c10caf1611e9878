//! # Adapter Control
//!
//! Queries and drives the host's Bluetooth adapter through `bluetoothctl`,
//! the BlueZ control utility every mainstream Linux ships.
//!
//! Error mapping:
//! - `bluetoothctl` binary absent → [`PrintError::ModuleUnavailable`] with
//!   setup guidance (non-retryable)
//! - EACCES/EPERM invoking it → [`PrintError::PermissionDenied`]
//! - adapter powered off and `power on` refused → [`PrintError::AdapterDisabled`]

use std::io;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{PrintError, PrintResult};
use crate::transport::PairedDevice;

/// Run bluetoothctl with the given arguments, returning stdout.
fn bluetoothctl(args: &[&str]) -> PrintResult<String> {
    let output = Command::new("bluetoothctl").args(args).output().map_err(|e| {
        match e.kind() {
            io::ErrorKind::NotFound => PrintError::ModuleUnavailable(
                "bluetoothctl not found; install the BlueZ utilities (e.g. \
                 `apt install bluez`) and pair the printer first"
                    .into(),
            ),
            io::ErrorKind::PermissionDenied => {
                PrintError::PermissionDenied(format!("cannot run bluetoothctl: {e}"))
            }
            _ => PrintError::Io(e),
        }
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!(args = ?args, status = ?output.status.code(), "bluetoothctl");
    Ok(stdout)
}

/// Whether `bluetoothctl show` reports the adapter as powered.
fn is_powered(show_output: &str) -> bool {
    show_output
        .lines()
        .any(|line| line.trim().eq_ignore_ascii_case("Powered: yes"))
}

/// Check adapter power, attempting the enable flow once if it is off.
pub fn ensure_powered() -> PrintResult<()> {
    let show = bluetoothctl(&["show"])?;
    if show.trim().is_empty() {
        return Err(PrintError::ModuleUnavailable(
            "no Bluetooth controller found; check that the radio is present \
             and the bluetooth service is running"
                .into(),
        ));
    }
    if is_powered(&show) {
        return Ok(());
    }

    info!("adapter powered off, attempting power on");
    let _ = bluetoothctl(&["power", "on"])?;
    let show = bluetoothctl(&["show"])?;
    if is_powered(&show) {
        Ok(())
    } else {
        Err(PrintError::AdapterDisabled(
            "adapter is powered off and could not be enabled".into(),
        ))
    }
}

/// Parse one line of `bluetoothctl devices` output.
///
/// Format: `Device 66:22:D4:2A:0F:91 RPP02N`. BlueZ substitutes the address
/// (with dashes) when a device never reported a name; that placeholder is
/// treated as no name.
fn parse_device_line(line: &str) -> Option<PairedDevice> {
    let rest = line.trim().strip_prefix("Device ")?;
    let (address, name) = match rest.split_once(' ') {
        Some((addr, name)) => (addr.to_string(), name.trim().to_string()),
        None => (rest.to_string(), String::new()),
    };
    if address.is_empty() {
        return None;
    }
    let placeholder = address.replace(':', "-");
    let name = if name.is_empty() || name == placeholder {
        None
    } else {
        Some(name)
    };
    Some(PairedDevice { name, address })
}

/// Enumerate bonded peripherals.
///
/// Requires a powered adapter (the enable flow runs if needed). Newer BlueZ
/// uses `devices Paired`; older releases spell it `paired-devices`.
pub fn paired_devices() -> PrintResult<Vec<PairedDevice>> {
    ensure_powered()?;

    let mut output = bluetoothctl(&["devices", "Paired"])?;
    if !output.lines().any(|l| l.trim().starts_with("Device ")) {
        output = bluetoothctl(&["paired-devices"])?;
    }

    Ok(output.lines().filter_map(parse_device_line).collect())
}
