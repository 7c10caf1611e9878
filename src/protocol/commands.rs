//! # ESC/POS Control Commands
//!
//! The small fixed vocabulary of control codes a receipt job interleaves
//! with laid-out text.
//!
//! ## Escape Sequence Structure
//!
//! | Command | Bytes | Effect |
//! |---------|-------|--------|
//! | ESC @   | 1B 40 | initialize printer |
//! | ESC a n | 1B 61 n | alignment (0 left, 1 center, 2 right) |
//! | GS ! n  | 1D 21 n | character size (high nibble width, low height) |
//! | ESC d n | 1B 64 n | print and feed n lines |
//! | GS V 0  | 1D 56 00 | full paper cut |
//! | LF      | 0A | print line buffer and advance |

// ============================================================================
// PREFIX BYTES
// ============================================================================

/// ESC (Escape) - primary command prefix
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - extended command prefix (size, cut, graphics)
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// ALIGNMENT
// ============================================================================

/// Horizontal alignment for subsequent lines (ESC a n).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Select alignment for everything printed until the next change.
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    let n = match alignment {
        Alignment::Left => 0,
        Alignment::Center => 1,
        Alignment::Right => 2,
    };
    vec![ESC, b'a', n]
}

// ============================================================================
// INITIALIZATION AND TEXT SIZE
// ============================================================================

/// Initialize the printer (ESC @). Clears the line buffer and resets
/// formatting, alignment and line spacing to power-on defaults. Sent at the
/// start of every job so leftovers from an aborted job can't leak in.
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// Normal 1x1 character size (GS ! 0).
#[inline]
pub fn text_normal() -> Vec<u8> {
    vec![GS, b'!', 0x00]
}

/// Double-height characters (GS ! 1). Used for the store name and the
/// total line.
#[inline]
pub fn text_double_height() -> Vec<u8> {
    vec![GS, b'!', 0x01]
}

// ============================================================================
// PAPER CONTROL
// ============================================================================

/// Print and feed `n` lines (ESC d n).
#[inline]
pub fn feed(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// Full paper cut at the current position (GS V 0).
///
/// Feed first ([`feed`]) so the cut lands below the printed content; some
/// printers without a cutter silently ignore this.
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0x00]
}

// ============================================================================
// HELPERS
// ============================================================================

/// Encode a u16 as little-endian `[low, high]`, the byte order ESC/POS uses
/// for all multi-byte integers.
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
