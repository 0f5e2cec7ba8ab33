//! Social-preview card composition.
//!
//! Lays out a repository title, a center image, and a description line on the
//! 1280x640 canvas GitHub recommends for social previews. The center image is
//! best-effort: a card is still produced when it cannot be loaded, with the
//! description moved to mid-canvas.

use crate::error::{Error, Result};
use crate::font;
use crate::text;
use image::{imageops, imageops::FilterType, DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// GitHub recommended social-preview dimensions.
const CARD_WIDTH: u32 = 1280;
const CARD_HEIGHT: u32 = 640;
/// Safe area in pixels.
const BORDER: u32 = 40;

const TITLE_SIZE: f32 = 60.0;
const SUBTEXT_SIZE: f32 = 32.0;

/// Light pink background matching the GitHub template.
const BACKGROUND: Rgb<u8> = Rgb([0xff, 0xee, 0xf0]);
/// Title ink (`#24292e`).
const TITLE_COLOR: Rgb<u8> = Rgb([0x24, 0x29, 0x2e]);
/// Subtext ink (`#586069`).
const SUBTEXT_COLOR: Rgb<u8> = Rgb([0x58, 0x60, 0x69]);

/// Options for composing a social-preview card.
///
/// Use [`CardOptions::builder()`] to construct.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CardOptions {
    /// Repository name used as the card heading
    pub title: String,

    /// Path to the center image
    pub image_path: PathBuf,

    /// Description text drawn below the image
    pub subtext: String,

    /// Output PNG path
    pub output: PathBuf,

    /// Font family for both text runs
    pub font_family: String,
}

impl CardOptions {
    /// Creates a new options builder.
    #[must_use]
    pub fn builder() -> CardOptionsBuilder {
        CardOptionsBuilder::default()
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty or the output path has no
    /// parentable location.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::config("card title must not be empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::config("output path must not be empty"));
        }
        Ok(())
    }
}

/// Builder for [`CardOptions`].
#[derive(Debug, Default)]
pub struct CardOptionsBuilder {
    title: Option<String>,
    image_path: Option<PathBuf>,
    subtext: Option<String>,
    output: Option<PathBuf>,
    font_family: Option<String>,
}

impl CardOptionsBuilder {
    /// Sets the card heading.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the center image path.
    #[must_use]
    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Sets the description text.
    #[must_use]
    pub fn subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = Some(subtext.into());
        self
    }

    /// Sets the output PNG path.
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Sets the font family.
    #[must_use]
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Builds and validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<CardOptions> {
        let options = CardOptions {
            title: self.title.unwrap_or_else(|| "My Awesome Repo".to_string()),
            image_path: self.image_path.unwrap_or_default(),
            subtext: self
                .subtext
                .unwrap_or_else(|| "An awesome project!".to_string()),
            output: self
                .output
                .unwrap_or_else(|| PathBuf::from("social_preview.png")),
            font_family: self.font_family.unwrap_or_else(|| "Sans".to_string()),
        };

        options.validate()?;
        Ok(options)
    }
}

/// Composes the card in memory.
///
/// # Errors
///
/// Returns an error if no usable font exists on the host. A failed center
/// image load is downgraded to a warning.
pub fn compose(options: &CardOptions) -> Result<RgbImage> {
    options.validate()?;

    let font = font::resolve(&options.font_family)?;
    let mut card = RgbImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);

    // Title at the top, centered within the safe area.
    let title_extent = text::measure(font, &options.title, TITLE_SIZE);
    let title_x = (CARD_WIDTH.saturating_sub(title_extent.width)) / 2;
    let title_y = BORDER;
    text::draw(
        &mut card,
        font,
        &options.title,
        TITLE_SIZE,
        title_x as i32,
        title_y as i32,
        TITLE_COLOR,
    );

    let subtext_extent = text::measure(font, &options.subtext, SUBTEXT_SIZE);

    let subtext_y = match load_center_image(&options.image_path) {
        Ok(img) => {
            let available_width = CARD_WIDTH - 2 * BORDER;
            let available_height = CARD_HEIGHT
                .saturating_sub(title_y + title_extent.height + BORDER * 3)
                .saturating_sub(subtext_extent.height + SUBTEXT_SIZE as u32);

            let fitted = fit_within(&img, available_width, available_height.max(1));

            let img_x = (CARD_WIDTH - fitted.width()) / 2;
            let img_y = title_y + title_extent.height + BORDER;
            imageops::overlay(&mut card, &fitted, i64::from(img_x), i64::from(img_y));

            debug!(
                "Placed center image at ({}, {}), {}x{}",
                img_x,
                img_y,
                fitted.width(),
                fitted.height()
            );

            img_y + fitted.height() + BORDER / 2
        }
        Err(e) => {
            // Best-effort: keep the card, center the subtext instead.
            warn!("Could not load center image: {e}");
            CARD_HEIGHT / 2 + 50
        }
    };

    // Subtext, centered, never below the safe area.
    let subtext_x = (CARD_WIDTH.saturating_sub(subtext_extent.width)) / 2;
    let max_y = CARD_HEIGHT.saturating_sub(BORDER + subtext_extent.height);
    let subtext_y = subtext_y.min(max_y);
    text::draw(
        &mut card,
        font,
        &options.subtext,
        SUBTEXT_SIZE,
        subtext_x as i32,
        subtext_y as i32,
        SUBTEXT_COLOR,
    );

    Ok(card)
}

/// Composes the card and writes it as a PNG.
///
/// # Errors
///
/// Returns an error if composition fails or the PNG cannot be written.
pub fn render(options: &CardOptions) -> Result<PathBuf> {
    let card = compose(options)?;

    if let Some(parent) = options.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    card.save(&options.output)
        .map_err(|e| Error::image(&options.output, e))?;

    info!("Social card saved to: {}", options.output.display());
    Ok(options.output.clone())
}

fn load_center_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| Error::image(path, e))?;
    Ok(match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    })
}

/// Scales an image down to fit the given box, preserving aspect ratio.
/// Images already inside the box are left alone.
fn fit_within(img: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    if w <= max_width && h <= max_height {
        return img.clone();
    }

    let scale = (f64::from(max_width) / f64::from(w)).min(f64::from(max_height) / f64::from(h));
    let new_w = ((f64::from(w) * scale).floor() as u32).max(1);
    let new_h = ((f64::from(h) * scale).floor() as u32).max(1);

    imageops::resize(img, new_w, new_h, FilterType::Lanczos3)
}
