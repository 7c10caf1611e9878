//! # ESC/POS Protocol
//!
//! Command builders for the ESC/POS control-code vocabulary this crate
//! needs: initialization, alignment, text sizing, paper feed, cutting
//! ([`commands`]) and the raster image block ([`graphics`]).
//!
//! Commands are byte sequences prefixed with ESC (0x1B) or GS (0x1D).
//! Multi-byte integers are little-endian.

pub mod commands;
pub mod graphics;
