//! # struk
//!
//! Receipt printing pipeline for cheap Bluetooth thermal printers
//! (RPP02N-class, 58mm/80mm paper) speaking ESC/POS over RFCOMM.
//!
//! The pipeline runs in four stages:
//!
//! ```text
//! ReceiptData ──layout/compose──► CommandStream ──protocol──► bytes
//!                                                               │
//!            printer ◄──rfcomm transport◄──connection manager◄──┘
//! ```
//!
//! | Module      | Responsibility                                         |
//! |-------------|--------------------------------------------------------|
//! | `receipt`   | Receipt payload model, fee alias normalization         |
//! | `layout`    | Fixed-width text shaping: pad, wrap, Rupiah formatting |
//! | `raster`    | Logo decode, scale, threshold, 1-bit packing           |
//! | `protocol`  | ESC/POS command and raster byte encoding               |
//! | `stream`    | Ordered control/text fragment accumulator              |
//! | `compose`   | Receipt and test-page job assembly                     |
//! | `transport` | Bluetooth adapter, RFCOMM channel, connection manager  |
//! | `settings`  | Persistent key-value preferences                       |
//! | `service`   | End-to-end facade                                      |
//!
//! Everything is synchronous; a print job is a single blocking call.
//!
//! ## Example
//!
//! ```no_run
//! use struk::{PaperProfile, PrinterService};
//! use struk::settings::JsonFileStore;
//! use struk::transport::RfcommConnector;
//!
//! # fn main() -> struk::PrintResult<()> {
//! let store = JsonFileStore::new(JsonFileStore::default_path());
//! let mut service =
//!     PrinterService::new(Box::new(RfcommConnector), store, PaperProfile::MM58);
//! service.test_print(Some("66:22:D4:2A:0F:91"))?;
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod error;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod raster;
pub mod receipt;
pub mod service;
pub mod settings;
pub mod stream;
pub mod transport;

pub use error::{PrintError, PrintResult};
pub use printer::PaperProfile;
pub use receipt::ReceiptData;
pub use service::{ACTIVE_PRINTER_KEY, PrinterService};
pub use stream::CommandStream;
