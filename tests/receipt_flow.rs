//! End-to-end tests: JSON payload → composed job → chunked delivery,
//! against mock transports so no hardware is involved.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;

use struk::settings::MemoryStore;
use struk::transport::{ConnectionManager, Connector, PairedDevice, Transport};
use struk::{PaperProfile, PrintError, PrintResult, PrinterService, ReceiptData};

const PRINTER_A: &str = "66:22:D4:2A:0F:91";
const PRINTER_B: &str = "00:11:22:33:44:55";

/// Everything the mock transports observed, across connections.
#[derive(Default)]
struct Observed {
    chunks: Mutex<Vec<Vec<u8>>>,
    opened: Mutex<Vec<String>>,
    closed: Mutex<Vec<String>>,
}

struct MockTransport {
    address: String,
    observed: Arc<Observed>,
}

impl Transport for MockTransport {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.observed.chunks.lock().unwrap().push(chunk.to_vec());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.observed.closed.lock().unwrap().push(self.address.clone());
        // close failures must never block a new connection
        Err(io::Error::new(io::ErrorKind::Other, "close failed"))
    }
}

struct MockConnector {
    observed: Arc<Observed>,
}

impl Connector for MockConnector {
    fn paired_devices(&self) -> PrintResult<Vec<PairedDevice>> {
        Ok(vec![
            PairedDevice {
                name: Some("RPP02N".into()),
                address: PRINTER_A.into(),
            },
            PairedDevice {
                name: None,
                address: PRINTER_B.into(),
            },
        ])
    }

    fn open(&self, address: &str) -> PrintResult<Box<dyn Transport>> {
        self.observed.opened.lock().unwrap().push(address.to_string());
        Ok(Box::new(MockTransport {
            address: address.to_string(),
            observed: self.observed.clone(),
        }))
    }
}

fn service() -> (PrinterService<MemoryStore>, Arc<Observed>) {
    let observed = Arc::new(Observed::default());
    let connector = MockConnector {
        observed: observed.clone(),
    };
    let svc = PrinterService::new(
        Box::new(connector),
        MemoryStore::default(),
        PaperProfile::MM58,
    );
    (svc, observed)
}

fn observed_bytes(observed: &Observed) -> Vec<u8> {
    observed.chunks.lock().unwrap().iter().flatten().copied().collect()
}

fn sample_receipt() -> ReceiptData {
    serde_json::from_str(
        r#"{
            "storeName": "Kopi Senja",
            "storeAddress": "Jl. Melati No. 3, Bandung",
            "invoice": "INV-0042",
            "date": "2026-08-29 14:05",
            "paymentMethod": "QRIS",
            "subtotal": 25000,
            "amountReceived": 30000,
            "change": 2500,
            "items": [
                {
                    "name": "Matcha Latte",
                    "qty": 1,
                    "price": 25000,
                    "note": {
                        "size": "Large",
                        "sugar": "Normal",
                        "toppings": [{"label": "Boba", "price": 2500}],
                        "takeaway": true
                    }
                }
            ],
            "biayaLayanan": 2500
        }"#,
    )
    .unwrap()
}

#[test]
fn test_print_receipt_end_to_end() {
    let (mut svc, observed) = service();
    svc.print_receipt(&sample_receipt(), Some(PRINTER_A)).unwrap();

    let bytes = observed_bytes(&observed);
    assert_eq!(&bytes[..2], &[0x1B, 0x40], "job must start with ESC @");

    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Kopi Senja"));
    assert!(text.contains("INV-0042"));
    assert!(text.contains("Matcha Latte"));
    assert!(text.contains("Rp 25.000"));
    // biayaLayanan alias surfaces as the Service fee line
    assert!(text.contains("Service"));
    assert!(text.contains("+ Rp 2.500"));
    // fallback total = subtotal + service fee
    assert!(text.contains("Rp 27.500"));
    assert!(text.contains("Terima kasih"));

    // feeds then cuts at the very end
    let tail = &bytes[bytes.len() - 6..];
    assert_eq!(tail, &[0x1B, 0x64, 0x04, 0x1D, 0x56, 0x00]);
}

#[test]
fn test_print_to_unpaired_device_is_device_not_found() {
    let (mut svc, observed) = service();
    let err = svc
        .print_receipt(&sample_receipt(), Some("AA:BB:CC:DD:EE:FF"))
        .unwrap_err();
    assert!(matches!(err, PrintError::DeviceNotFound(_)));
    assert!(observed.opened.lock().unwrap().is_empty(), "no connect attempt");
}

#[test]
fn test_zero_quantity_item_never_reaches_transport() {
    let (mut svc, observed) = service();
    let mut data = sample_receipt();
    data.items[0].qty = 0;
    let err = svc.print_receipt(&data, Some(PRINTER_A)).unwrap_err();
    assert!(matches!(err, PrintError::InvalidReceipt(_)));
    assert!(observed.chunks.lock().unwrap().is_empty());
}

#[test]
fn test_second_printer_supersedes_first() {
    let (mut svc, observed) = service();
    svc.test_print(Some(PRINTER_A)).unwrap();
    svc.test_print(Some(PRINTER_B)).unwrap();

    // the old link's close was attempted (and its failure ignored)
    assert_eq!(
        observed.closed.lock().unwrap().as_slice(),
        &[PRINTER_A.to_string()]
    );
    assert_eq!(
        observed.opened.lock().unwrap().as_slice(),
        &[PRINTER_A.to_string(), PRINTER_B.to_string()]
    );
}

#[test]
fn test_repeat_print_reuses_connection() {
    let (mut svc, observed) = service();
    svc.test_print(Some(PRINTER_A)).unwrap();
    svc.test_print(Some(PRINTER_A)).unwrap();
    assert_eq!(observed.opened.lock().unwrap().len(), 1);
}

#[test]
fn test_large_job_is_chunked_in_order() {
    let observed = Arc::new(Observed::default());
    let connector = MockConnector {
        observed: observed.clone(),
    };
    let mut manager = ConnectionManager::new(Box::new(connector));
    manager.set_chunk_delay(Duration::from_millis(1));
    manager.connect(PRINTER_A).unwrap();

    let payload: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();
    manager.write(&payload).unwrap();

    let chunks = observed.chunks.lock().unwrap();
    let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(sizes, vec![256, 256, 256, 232]);
    let rejoined: Vec<u8> = chunks.iter().flatten().copied().collect();
    assert_eq!(rejoined, payload);
}

#[test]
fn test_paired_listing_names_and_fallback() {
    let (svc, _) = service();
    let devices = svc.list_paired().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].display_name(), "RPP02N");
    assert_eq!(devices[1].display_name(), "Unknown Device");
}
