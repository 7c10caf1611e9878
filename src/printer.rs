//! # Paper Profiles
//!
//! Hardware characteristics of the supported receipt paper widths.
//!
//! | Profile | Paper | Columns | Print width (dots) |
//! |---------|-------|---------|--------------------|
//! | MM58    | 58mm  | 32      | 384                |
//! | MM80    | 80mm  | 48      | 576                |
//!
//! Low-cost ESC/POS printers are 203 DPI (~8 dots/mm); 58mm paper gives
//! 48mm of printable width = 384 dots, 80mm paper gives 72mm = 576 dots.

/// Fixed characteristics of one paper width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperProfile {
    /// Profile name
    pub name: &'static str,

    /// Text columns per line (Font A)
    pub width_chars: usize,

    /// Maximum raster width in dots
    pub width_dots: u16,
}

impl PaperProfile {
    /// 58mm paper: 32 columns, 384-dot raster width. The default for the
    /// portable printers this crate targets.
    pub const MM58: PaperProfile = PaperProfile {
        name: "58mm",
        width_chars: 32,
        width_dots: 384,
    };

    /// 80mm paper: 48 columns, 576-dot raster width.
    pub const MM80: PaperProfile = PaperProfile {
        name: "80mm",
        width_chars: 48,
        width_dots: 576,
    };

    /// Look up a profile by paper size in millimeters.
    pub fn for_paper_mm(mm: u16) -> Option<PaperProfile> {
        match mm {
            58 => Some(Self::MM58),
            80 => Some(Self::MM80),
            _ => None,
        }
    }
}

impl Default for PaperProfile {
    fn default() -> Self {
        Self::MM58
    }
}
