//! # Bitmap Rasterizer
//!
//! Converts a store logo (PNG/WebP, fetched or inline) into the printer's
//! 1-bit raster format, bounded to the paper's maximum print width.
//!
//! Pipeline: decode -> nearest-neighbor downscale -> alpha-weighted
//! luminance threshold -> MSB-first bit packing.
//!
//! The logo is best-effort: every function here returns a `Result` and the
//! facade maps any error to "print without logo". Nothing in this module
//! can abort a receipt.

use std::time::Duration;

use base64::Engine;
use image::{DynamicImage, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::error::{PrintError, PrintResult};

/// Luminance cutoff on a 0-255 scale: pixels darker than this print as ink.
pub const DEFAULT_THRESHOLD: u8 = 185;

/// HTTP fetch timeout for remote logos.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// RASTER IMAGE
// ============================================================================

/// A packed monochrome bitmap in printer row order.
///
/// Each row occupies `ceil(width / 8)` bytes; bit 7 of a row's first byte is
/// the leftmost pixel, 1 = ink. Created once per print job and discarded
/// after its bytes are appended to the command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Bytes per packed row.
    pub fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }
}

// ============================================================================
// LOGO SOURCES
// ============================================================================

/// Where a logo reference points: a remote URL or an inline base64 payload.
///
/// Mirrors what the ordering layer sends: `data:image/...` URIs, plain
/// `http(s)` URLs, or a bare base64 string with no prefix at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Url(String),
    Base64(String),
}

impl LogoSource {
    /// Classify a logo reference string. Returns `None` for anything that is
    /// recognizably neither a URL nor base64 data.
    pub fn parse(value: &str) -> Option<LogoSource> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.starts_with("data:image/") {
            let (_, payload) = value.split_once("base64,")?;
            return Some(LogoSource::Base64(payload.to_string()));
        }
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Some(LogoSource::Url(value.to_string()));
        }
        // Raw base64 without a data-URI prefix
        if value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        {
            return Some(LogoSource::Base64(value.to_string()));
        }
        None
    }
}

// ============================================================================
// DECODE
// ============================================================================

/// Resolve a logo reference all the way to a packed raster image no wider
/// than `max_width` dots.
pub fn load_logo(reference: &str, max_width: u16) -> PrintResult<RasterImage> {
    let source = LogoSource::parse(reference)
        .ok_or_else(|| PrintError::Image(format!("unrecognized logo reference: {reference}")))?;

    let bytes = match &source {
        LogoSource::Url(url) => fetch(url)?,
        LogoSource::Base64(payload) => base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| PrintError::Image(format!("invalid base64 logo: {e}")))?,
    };

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| PrintError::Image(format!("failed to decode logo: {e}")))?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "decoded logo"
    );

    Ok(rasterize(&decoded, max_width, DEFAULT_THRESHOLD))
}

fn fetch(url: &str) -> PrintResult<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("struk/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| PrintError::Image(format!("HTTP client error: {e}")))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| PrintError::Image(format!("failed to download {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(PrintError::Image(format!(
            "failed to download {url}: HTTP {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .map_err(|e| PrintError::Image(format!("failed to read logo body: {e}")))?;
    Ok(bytes.to_vec())
}

// ============================================================================
// RESIZE, THRESHOLD, PACK
// ============================================================================

/// Convert a decoded image to the packed printer format.
///
/// Images wider than `max_width` are downscaled with nearest-neighbor
/// sampling (logos are flat-color artwork; interpolation would only smear
/// the threshold step), height scaled proportionally with a 1px floor.
/// Images at or under the limit pass through unresized, so rasterizing an
/// already-monochrome, already-sized image is stable across runs.
pub fn rasterize(image: &DynamicImage, max_width: u16, threshold: u8) -> RasterImage {
    let rgba = if image.width() > max_width as u32 {
        let scaled_height = ((image.height() as f32) * (max_width as f32)
            / (image.width() as f32))
            .round()
            .max(1.0) as u32;
        image
            .resize_exact(max_width as u32, scaled_height, FilterType::Nearest)
            .to_rgba8()
    } else {
        image.to_rgba8()
    };
    pack(&rgba, threshold)
}

/// Perceptual luminance weighted by alpha, 0.0 (black) to 255.0 (white).
/// Fully transparent pixels come out at 0 luminance scaled to 0... which
/// would read as ink, so alpha scales the *ink contribution*: transparent
/// pixels render as paper.
fn luminance(r: u8, g: u8, b: u8, a: u8) -> f32 {
    let lum = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    // Blend toward white as alpha falls off
    let alpha = a as f32 / 255.0;
    lum * alpha + 255.0 * (1.0 - alpha)
}

fn pack(rgba: &RgbaImage, threshold: u8) -> RasterImage {
    let (width, height) = rgba.dimensions();
    let row_bytes = (width as usize).div_ceil(8);
    let mut data = vec![0u8; row_bytes * height as usize];

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        if luminance(r, g, b, a) < threshold as f32 {
            data[y as usize * row_bytes + x as usize / 8] |= 0x80 >> (x % 8);
        }
    }

    RasterImage {
        width: width as u16,
        height: height as u16,
        data,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(pixel)))
    }

    #[test]
    fn test_parse_data_uri() {
        let src = LogoSource::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(src, LogoSource::Base64("iVBORw0KGgo=".into()));
    }

    #[test]
    fn test_parse_urls_case_insensitive() {
        assert_eq!(
            LogoSource::parse("https://example.com/logo.png"),
            Some(LogoSource::Url("https://example.com/logo.png".into()))
        );
        assert!(matches!(
            LogoSource::parse("HTTP://example.com/a.webp"),
            Some(LogoSource::Url(_))
        ));
    }

    #[test]
    fn test_parse_bare_base64() {
        assert!(matches!(
            LogoSource::parse("iVBORw0KGgoAAAANSUhEUg=="),
            Some(LogoSource::Base64(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(LogoSource::parse(""), None);
        assert_eq!(LogoSource::parse("   "), None);
        assert_eq!(LogoSource::parse("not a logo at all!"), None);
        assert_eq!(LogoSource::parse("ftp://example.com/x.png"), None);
    }

    #[test]
    fn test_row_byte_count() {
        for width in [1u32, 7, 8, 9, 100, 384] {
            let img = solid(width, 3, [0, 0, 0, 255]);
            let raster = rasterize(&img, 384, DEFAULT_THRESHOLD);
            assert_eq!(raster.row_bytes(), (width as usize).div_ceil(8));
            assert_eq!(raster.data.len(), raster.row_bytes() * 3);
        }
    }

    #[test]
    fn test_black_image_is_all_ink() {
        let raster = rasterize(&solid(16, 2, [0, 0, 0, 255]), 384, DEFAULT_THRESHOLD);
        assert_eq!(raster.data, vec![0xFF; 4]);
    }

    #[test]
    fn test_white_image_is_all_paper() {
        let raster = rasterize(&solid(16, 2, [255, 255, 255, 255]), 384, DEFAULT_THRESHOLD);
        assert_eq!(raster.data, vec![0x00; 4]);
    }

    #[test]
    fn test_transparent_black_is_paper() {
        // Alpha weighting: fully transparent pixels never print.
        let raster = rasterize(&solid(8, 1, [0, 0, 0, 0]), 384, DEFAULT_THRESHOLD);
        assert_eq!(raster.data, vec![0x00]);
    }

    #[test]
    fn test_msb_first_packing() {
        // Leftmost pixel black, rest white, in a 9px row: bit 7 of byte 0
        // set, second byte (the 9th pixel) clear.
        let mut img = RgbaImage::from_pixel(9, 1, Rgba([255, 255, 255, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(8, 0, Rgba([255, 255, 255, 255]));
        let raster = rasterize(
            &DynamicImage::ImageRgba8(img),
            384,
            DEFAULT_THRESHOLD,
        );
        assert_eq!(raster.data, vec![0x80, 0x00]);
    }

    #[test]
    fn test_downscale_width_and_proportional_height() {
        let img = solid(768, 300, [0, 0, 0, 255]);
        let raster = rasterize(&img, 384, DEFAULT_THRESHOLD);
        assert_eq!(raster.width, 384);
        assert_eq!(raster.height, 150);
    }

    #[test]
    fn test_downscale_height_floor() {
        let img = solid(1000, 1, [0, 0, 0, 255]);
        let raster = rasterize(&img, 384, DEFAULT_THRESHOLD);
        assert_eq!(raster.height, 1);
    }

    #[test]
    fn test_no_upscale_below_max_width() {
        let img = solid(100, 40, [0, 0, 0, 255]);
        let raster = rasterize(&img, 384, DEFAULT_THRESHOLD);
        assert_eq!((raster.width, raster.height), (100, 40));
    }

    #[test]
    fn test_rasterize_is_idempotent() {
        // Already-monochrome, already-at-width input: repeated runs agree.
        let mut img = RgbaImage::from_pixel(384, 4, Rgba([255, 255, 255, 255]));
        for x in 0..384 {
            if x % 3 == 0 {
                img.put_pixel(x, 1, Rgba([0, 0, 0, 255]));
            }
        }
        let img = DynamicImage::ImageRgba8(img);
        let first = rasterize(&img, 384, DEFAULT_THRESHOLD);
        let second = rasterize(&img, 384, DEFAULT_THRESHOLD);
        assert_eq!(first, second);
        assert_eq!(first.width, 384);
    }

    #[test]
    fn test_load_logo_inline_roundtrip() {
        // Encode a tiny black PNG, feed it back through the inline path.
        let img = solid(10, 10, [0, 0, 0, 255]);
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();
        let payload = base64::engine::general_purpose::STANDARD.encode(png.into_inner());

        let raster = load_logo(&payload, 384).unwrap();
        assert_eq!((raster.width, raster.height), (10, 10));
        // All ten rows fully inked in the low 10 bits of each 2-byte row
        assert_eq!(raster.data[0], 0xFF);
    }

    #[test]
    fn test_load_logo_bad_data_is_error_not_panic() {
        assert!(matches!(
            load_logo("aGVsbG8gd29ybGQ=", 384), // valid base64, not an image
            Err(PrintError::Image(_))
        ));
    }
}
