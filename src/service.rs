//! # Printer Service
//!
//! High-level facade tying the pipeline together: device discovery via the
//! connector, an active-printer preference in the settings store, and the
//! two job entry points (`test_print`, `print_receipt`). Callers hold one
//! `PrinterService` and never touch the transport directly.

use tracing::{info, warn};

use crate::compose;
use crate::error::{PrintError, PrintResult};
use crate::printer::PaperProfile;
use crate::raster::{self, RasterImage};
use crate::receipt::ReceiptData;
use crate::settings::KeyValueStore;
use crate::transport::{ConnectionManager, Connector, PairedDevice};

/// Settings key holding the active printer's MAC address.
pub const ACTIVE_PRINTER_KEY: &str = "printer:active_mac";

pub struct PrinterService<S: KeyValueStore> {
    manager: ConnectionManager,
    store: S,
    paper: PaperProfile,
}

impl<S: KeyValueStore> PrinterService<S> {
    pub fn new(connector: Box<dyn Connector>, store: S, paper: PaperProfile) -> Self {
        Self {
            manager: ConnectionManager::new(connector),
            store,
            paper,
        }
    }

    /// Bonded Bluetooth peripherals, printers and otherwise. The list is
    /// not filtered; receipt printers rarely advertise a usable class.
    pub fn list_paired(&self) -> PrintResult<Vec<PairedDevice>> {
        self.manager.paired_devices()
    }

    /// Persist `address` as the active printer.
    pub fn set_active(&mut self, address: &str) -> PrintResult<()> {
        self.require_bonded(address)?;
        self.store.set(ACTIVE_PRINTER_KEY, address)?;
        info!(address, "active printer saved");
        Ok(())
    }

    /// The persisted active printer address, if one was chosen.
    pub fn active(&self) -> PrintResult<Option<String>> {
        self.store.get(ACTIVE_PRINTER_KEY)
    }

    /// Clear the persisted active printer.
    pub fn clear_active(&mut self) -> PrintResult<()> {
        self.store.remove(ACTIVE_PRINTER_KEY)
    }

    /// Print the fixed diagnostic page to `address` (or the saved printer).
    pub fn test_print(&mut self, address: Option<&str>) -> PrintResult<()> {
        let address = self.resolve_address(address)?;
        let job = compose::test_page(&address, &self.paper);
        self.deliver(&address, &job.to_bytes())
    }

    /// Render and print a full receipt.
    ///
    /// The logo is best-effort: a fetch or decode failure downgrades to a
    /// warning and the receipt prints without it.
    pub fn print_receipt(
        &mut self,
        data: &ReceiptData,
        address: Option<&str>,
    ) -> PrintResult<()> {
        let address = self.resolve_address(address)?;
        let logo = self.load_logo(data);
        let job = compose::receipt_job(data, &self.paper, logo.as_ref())?;
        info!(invoice = %data.invoice, address = %address, "printing receipt");
        self.deliver(&address, &job.to_bytes())
    }

    /// Tear down any live connection.
    pub fn disconnect(&mut self) {
        self.manager.disconnect();
    }

    fn load_logo(&self, data: &ReceiptData) -> Option<RasterImage> {
        let reference = data.logo.as_deref()?;
        match raster::load_logo(reference, self.paper.width_dots) {
            Ok(raster) => Some(raster),
            Err(e) => {
                warn!(error = %e, "logo unavailable, printing without it");
                None
            }
        }
    }

    fn resolve_address(&self, explicit: Option<&str>) -> PrintResult<String> {
        let address = match explicit {
            Some(a) => a.to_string(),
            None => self.store.get(ACTIVE_PRINTER_KEY)?.ok_or_else(|| {
                PrintError::DeviceNotFound(
                    "no active printer chosen and no address given".into(),
                )
            })?,
        };
        self.require_bonded(&address)?;
        Ok(address)
    }

    fn require_bonded(&self, address: &str) -> PrintResult<()> {
        let devices = self.manager.paired_devices()?;
        if devices.iter().any(|d| d.address.eq_ignore_ascii_case(address)) {
            Ok(())
        } else {
            Err(PrintError::DeviceNotFound(format!(
                "{address} is not in the paired device list"
            )))
        }
    }

    fn deliver(&mut self, address: &str, payload: &[u8]) -> PrintResult<()> {
        self.manager.connect(address)?;
        self.manager.write(payload)
    }
}

// ============================================================================
// TESTS
// ============================================================================
