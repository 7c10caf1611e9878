//! # Job Composition
//!
//! Assembles complete print jobs: control codes interleaved with laid-out
//! text, in receipt order. Composition is a pure transform — no I/O happens
//! here; the finished [`CommandStream`] goes back to the facade, which hands
//! it to the transport.
//!
//! Receipt sequence: init, optional centered logo raster, centered header
//! (double-height store name, address), transaction block (invoice, date,
//! payment method, order type), per-item lines with wrapped details and note
//! bullets, totals block (subtotal, signed fee lines, double-height total,
//! tender, change), centered thank-you, feed, cut.

use crate::error::PrintResult;
use crate::layout::{format_rupiah, key_value_line, separator_line, wrap};
use crate::printer::PaperProfile;
use crate::protocol::commands::{self, Alignment};
use crate::protocol::graphics;
use crate::raster::RasterImage;
use crate::receipt::ReceiptData;
use crate::stream::CommandStream;

/// Indent for wrapped item details and note bullets.
const DETAIL_INDENT: usize = 2;

/// Lines fed past the last printed row before cutting.
const FEED_BEFORE_CUT: u8 = 4;

/// Build the full receipt job.
///
/// The logo raster, when present, was already decoded and packed by the
/// caller; a receipt without one simply skips that block.
pub fn receipt_job(
    data: &ReceiptData,
    paper: &PaperProfile,
    logo: Option<&RasterImage>,
) -> PrintResult<CommandStream> {
    data.validate()?;

    let width = paper.width_chars;
    let fees = data.fees();
    let separator = separator_line('-', width);
    let mut job = CommandStream::new();

    job.control(commands::init());

    // Logo block, always centered, ahead of the header
    if let Some(raster) = logo {
        job.control(commands::align(Alignment::Center));
        job.control(graphics::raster_block(raster.width, raster.height, &raster.data));
    }

    // Header
    job.control(commands::align(Alignment::Center));
    job.control(commands::text_double_height());
    job.line(&data.store_name);
    job.control(commands::text_normal());
    job.line(&data.store_address);
    job.line(&separator);

    // Transaction block
    job.control(commands::align(Alignment::Left));
    job.line(key_value_line("Invoice", &data.invoice, width));
    job.line(key_value_line("Tanggal", &data.date, width));
    job.line(key_value_line("Metode", &data.payment_method, width));
    job.line(key_value_line("Jenis Pesanan", data.order_type().label(), width));
    job.line(&separator);

    // Items
    for item in &data.items {
        let left = format!("{}x {}", item.qty, item.name);
        job.line(key_value_line(&left, &format_rupiah(item.price), width));

        if let Some(details) = &item.details {
            for line in wrap(details, width, DETAIL_INDENT) {
                job.line(line);
            }
        }
        if let Some(note) = &item.note {
            for bullet in note.bullets() {
                for line in wrap(&format!("- {bullet}"), width, DETAIL_INDENT) {
                    job.line(line);
                }
            }
        }
    }
    job.line(&separator);

    // Totals
    job.line(key_value_line("Subtotal", &format_rupiah(data.subtotal), width));
    if fees.admin != 0 {
        job.line(key_value_line("Biaya Admin", &signed_amount(fees.admin), width));
    }
    if fees.service != 0 {
        job.line(key_value_line("Service", &signed_amount(fees.service), width));
    }
    job.control(commands::text_double_height());
    job.line(key_value_line(
        "Total",
        &format_rupiah(data.effective_total(&fees)),
        width,
    ));
    job.control(commands::text_normal());
    job.line(key_value_line(
        "Uang Diterima",
        &format_rupiah(data.amount_received),
        width,
    ));
    job.line(key_value_line("Kembalian", &format_rupiah(data.change), width));
    job.line(&separator);

    // Footer
    job.control(commands::align(Alignment::Center));
    job.line("Terima kasih");
    job.control(commands::feed(FEED_BEFORE_CUT));
    job.control(commands::cut_full());

    Ok(job)
}

/// Build the short fixed confirmation page for `test_print`.
pub fn test_page(address: &str, paper: &PaperProfile) -> CommandStream {
    let width = paper.width_chars;
    let mut job = CommandStream::new();

    job.control(commands::init());
    job.control(commands::align(Alignment::Center));
    job.control(commands::text_double_height());
    job.line("TEST PRINT");
    job.control(commands::text_normal());
    job.line(separator_line('-', width));
    job.control(commands::align(Alignment::Left));
    job.line(key_value_line("Printer", address, width));
    job.line(key_value_line("Kertas", paper.name, width));
    job.control(commands::align(Alignment::Center));
    job.line("Printer siap digunakan");
    job.control(commands::feed(FEED_BEFORE_CUT));
    job.control(commands::cut_full());
    job
}

/// Fee amount with an explicit sign: `+ Rp 1.000` / `- Rp 500`.
fn signed_amount(amount: i64) -> String {
    let sign = if amount < 0 { '-' } else { '+' };
    format!("{sign} {}", format_rupiah(amount.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrintError;
    use crate::receipt::{ItemNote, ReceiptItem, Topping};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn matcha_receipt() -> ReceiptData {
        serde_json::from_value(json!({
            "store_name": "N7 Coffee",
            "store_address": "Jl. Kenangan No. 7, Bandung",
            "invoice": "INV-2026-0831",
            "date": "2026-08-29 14:30",
            "payment_method": "Tunai",
            "subtotal": 25000,
            "total": 27500,
            "service_fee": 2500,
            "amount_received": 30000,
            "change": 2500,
            "items": [{
                "name": "Matcha Latte",
                "qty": 1,
                "price": 25000,
                "note": {
                    "size": "Large",
                    "sugar": "Normal",
                    "toppings": ["Boba", "Grass Jelly"]
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_job_starts_with_init() {
        let job = receipt_job(&matcha_receipt(), &PaperProfile::MM58, None).unwrap();
        assert_eq!(&job.to_bytes()[0..2], &[0x1B, 0x40]);
    }

    #[test]
    fn test_job_ends_with_feed_and_cut() {
        let job = receipt_job(&matcha_receipt(), &PaperProfile::MM58, None).unwrap();
        let bytes = job.to_bytes();
        let tail = &bytes[bytes.len() - 6..];
        assert_eq!(tail, &[0x1B, 0x64, FEED_BEFORE_CUT, 0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_rendered_body_matches_scenario() {
        let job = receipt_job(&matcha_receipt(), &PaperProfile::MM58, None).unwrap();
        let text = job.rendered_text();
        let lines: Vec<&str> = text.lines().collect();

        let item_line = lines
            .iter()
            .find(|l| l.starts_with("1x Matcha Latte"))
            .expect("item line present");
        assert_eq!(item_line.chars().count(), 32);
        assert!(item_line.ends_with("Rp 25.000"));

        assert!(lines.contains(&"  - Ukuran Cup: Large"));
        assert!(lines.contains(&"  - Takaran Gula: Normal"));
        assert!(lines.iter().any(|l| l.contains("Topping: Boba, Grass")));

        let service = lines
            .iter()
            .find(|l| l.starts_with("Service"))
            .expect("service fee line present");
        assert!(service.ends_with("+ Rp 2.500"));

        let total = lines
            .iter()
            .find(|l| l.starts_with("Total"))
            .expect("total line present");
        assert!(total.ends_with("Rp 27.500"));
    }

    #[test]
    fn test_fallback_total_rendered_when_absent() {
        let mut data = matcha_receipt();
        data.total = None;
        let job = receipt_job(&data, &PaperProfile::MM58, None).unwrap();
        // 25.000 + 2.500 service
        assert!(job.rendered_text().contains("Rp 27.500"));
    }

    #[test]
    fn test_zero_fees_not_rendered() {
        let mut data = matcha_receipt();
        data.extra.clear();
        data.total = Some(25000);
        let job = receipt_job(&data, &PaperProfile::MM58, None).unwrap();
        let text = job.rendered_text();
        assert!(!text.contains("Biaya Admin"));
        assert!(!text.contains("Service"));
    }

    #[test]
    fn test_negative_fee_sign() {
        let mut data = matcha_receipt();
        data.extra
            .insert("admin_fee".into(), serde_json::json!(-1000));
        let job = receipt_job(&data, &PaperProfile::MM58, None).unwrap();
        let text = job.rendered_text();
        let admin = text
            .lines()
            .find(|l| l.starts_with("Biaya Admin"))
            .expect("admin fee line");
        assert!(admin.ends_with("- Rp 1.000"));
    }

    #[test]
    fn test_order_type_line() {
        let mut data = matcha_receipt();
        let job = receipt_job(&data, &PaperProfile::MM58, None).unwrap();
        assert!(job.rendered_text().lines().any(|l| {
            l.starts_with("Jenis Pesanan") && l.ends_with("Dine In")
        }));

        data.items[0].note = Some(ItemNote {
            takeaway: true,
            ..Default::default()
        });
        let job = receipt_job(&data, &PaperProfile::MM58, None).unwrap();
        assert!(job.rendered_text().lines().any(|l| {
            l.starts_with("Jenis Pesanan") && l.ends_with("Take Away")
        }));
    }

    #[test]
    fn test_priced_topping_rendered_with_surcharge() {
        let mut data = matcha_receipt();
        data.items[0].note = Some(ItemNote {
            toppings: vec![Topping::Priced {
                label: "Coffee Jelly".into(),
                price: 3000,
            }],
            ..Default::default()
        });
        let job = receipt_job(&data, &PaperProfile::MM58, None).unwrap();
        assert!(job.rendered_text().contains("Coffee Jelly (+Rp 3.000)"));
    }

    #[test]
    fn test_logo_block_included_and_centered() {
        let logo = RasterImage {
            width: 16,
            height: 2,
            data: vec![0xFF; 4],
        };
        let job = receipt_job(&matcha_receipt(), &PaperProfile::MM58, Some(&logo)).unwrap();
        let bytes = job.to_bytes();
        // align-center immediately after init, then the GS v 0 header
        assert_eq!(&bytes[2..5], &[0x1B, 0x61, 0x01]);
        assert_eq!(&bytes[5..8], &[0x1D, 0x76, 0x30]);
    }

    #[test]
    fn test_invalid_receipt_rejected() {
        let mut data = matcha_receipt();
        data.items.push(ReceiptItem {
            name: "Ghost".into(),
            qty: 0,
            price: 0,
            details: None,
            note: None,
        });
        assert!(matches!(
            receipt_job(&data, &PaperProfile::MM58, None),
            Err(PrintError::InvalidReceipt(_))
        ));
    }

    #[test]
    fn test_wide_paper_uses_wider_lines() {
        let job = receipt_job(&matcha_receipt(), &PaperProfile::MM80, None).unwrap();
        let text = job.rendered_text();
        let subtotal = text.lines().find(|l| l.starts_with("Subtotal")).unwrap();
        assert_eq!(subtotal.chars().count(), 48);
    }

    #[test]
    fn test_test_page_fixed_content() {
        let job = test_page("66:22:D4:2A:0F:91", &PaperProfile::MM58);
        let text = job.rendered_text();
        assert!(text.contains("TEST PRINT"));
        assert!(text.contains("66:22:D4:2A:0F:91"));
        let bytes = job.to_bytes();
        assert_eq!(&bytes[0..2], &[0x1B, 0x40]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1D, 0x56, 0x00]);
    }
}
