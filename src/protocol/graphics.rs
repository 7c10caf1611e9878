//! # ESC/POS Raster Graphics
//!
//! The `GS v 0` raster image block: a monochrome bitmap printed at the
//! current cursor position.
//!
//! ## Protocol Details
//!
//! | Format | Bytes |
//! |--------|-------|
//! | ASCII  | GS v 0 m xL xH yL yH d1...dk |
//! | Hex    | 1D 76 30 m xL xH yL yH d1...dk |
//!
//! - `m`: mode (0 = normal density)
//! - `xL, xH`: row width in **bytes**, little-endian
//! - `yL, yH`: row count, little-endian
//! - `d1...dk`: packed rows, k = row_bytes x rows
//!
//! ## Bit Packing
//!
//! One bit per dot, MSB first: bit 7 of byte 0 is the leftmost dot of the
//! row, 1 = black. Rows are padded to whole bytes.
//!
//! ```text
//! Byte 0xF0 = 11110000 = four black dots, four white
//! ```

use super::commands::{GS, LF, u16_le};

/// Build a complete raster block: the 8-byte `GS v 0` header, the packed
/// rows, and a trailing line feed so following text starts on a fresh line.
///
/// `data` must hold exactly `ceil(width_dots / 8) * rows` bytes.
pub fn raster_block(width_dots: u16, rows: u16, data: &[u8]) -> Vec<u8> {
    let row_bytes = width_dots.div_ceil(8);
    debug_assert!(
        data.len() == row_bytes as usize * rows as usize,
        "raster data length mismatch: expected {} ({} bytes x {} rows), got {}",
        row_bytes as usize * rows as usize,
        row_bytes,
        rows,
        data.len()
    );

    let [xl, xh] = u16_le(row_bytes);
    let [yl, yh] = u16_le(rows);

    let mut cmd = Vec::with_capacity(9 + data.len());
    cmd.extend_from_slice(&[GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd.push(LF);
    cmd
}
