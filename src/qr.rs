//! QR code PNG generation with an optional caption line.

use crate::error::{Error, Result};
use crate::font;
use crate::text;
use image::{imageops, Rgb, RgbImage};
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};
use tracing::info;

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);

/// Options for QR code generation.
#[derive(Debug, Clone)]
pub struct QrOptions {
    /// Text or URL to encode
    pub data: String,

    /// Pixels per module
    pub module_size: u32,

    /// Quiet zone width in modules around the symbol
    pub quiet_zone: u32,

    /// Error-correction level
    pub ec_level: EcLevel,

    /// Optional caption rendered below the symbol
    pub label: Option<String>,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            data: String::new(),
            module_size: 10,
            quiet_zone: 4,
            ec_level: EcLevel::L,
            label: None,
        }
    }
}

impl QrOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or the module size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.data.trim().is_empty() {
            return Err(Error::config("QR data must not be empty"));
        }
        if self.module_size == 0 {
            return Err(Error::config("module_size must be greater than 0"));
        }
        Ok(())
    }
}

/// Renders the QR symbol (plus optional caption) in memory.
///
/// # Errors
///
/// Returns an error if the data cannot be encoded, or if a caption was
/// requested and no usable font exists.
pub fn render(options: &QrOptions) -> Result<RgbImage> {
    options.validate()?;

    let code = QrCode::with_error_correction_level(options.data.as_bytes(), options.ec_level)?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;

    let scale = options.module_size;
    let quiet = options.quiet_zone * scale;
    let symbol_size = module_count * scale + 2 * quiet;

    let mut img = RgbImage::from_pixel(symbol_size, symbol_size, LIGHT);

    for (i, color) in modules.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;
        for dx in 0..scale {
            for dy in 0..scale {
                img.put_pixel(quiet + x * scale + dx, quiet + y * scale + dy, DARK);
            }
        }
    }

    let Some(label) = options.label.as_deref().filter(|l| !l.trim().is_empty()) else {
        return Ok(img);
    };

    attach_label(&img, label, quiet)
}

/// Appends a centered caption strip under the symbol.
fn attach_label(symbol: &RgbImage, label: &str, quiet: u32) -> Result<RgbImage> {
    let f = font::resolve("Sans")?;
    let label_size = (symbol.width() as f32 / 16.0).max(16.0);
    let extent = text::measure(f, label, label_size);

    let strip_height = extent.height + quiet;
    let width = symbol.width().max(extent.width + 2 * quiet);
    let mut out = RgbImage::from_pixel(width, symbol.height() + strip_height, LIGHT);

    let symbol_x = (width - symbol.width()) / 2;
    imageops::overlay(&mut out, symbol, i64::from(symbol_x), 0);

    let label_x = (width.saturating_sub(extent.width)) / 2;
    // The symbol's own quiet zone doubles as the gap above the caption.
    let label_y = symbol.height().saturating_sub(quiet / 2);
    text::draw(
        &mut out,
        f,
        label,
        label_size,
        label_x as i32,
        label_y as i32,
        DARK,
    );

    Ok(out)
}

/// Renders the QR code and writes it as a PNG.
///
/// # Errors
///
/// Returns an error if rendering fails or the PNG cannot be written.
pub fn save(options: &QrOptions, path: &Path) -> Result<PathBuf> {
    let img = render(options)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    img.save(path).map_err(|e| Error::image(path, e))?;

    info!("QR code saved as {}", path.display());
    Ok(path.to_path_buf())
}
