//! Color normalization: any decoded image to an opaque RGB raster.
//!
//! JPEG has no alpha channel, so transparent sources are composited onto a
//! white background. Palette images reach this module already expanded by
//! their decoder: a palette with transparency arrives as RGBA, one without
//! arrives as RGB.

use image::{DynamicImage, Rgb, RgbImage};

use crate::decode::RgbRaster;

/// Background color for transparent regions.
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// The strategy used to turn a decoded image into RGB8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Already 8-bit RGB; pixels are taken as-is.
    Passthrough,
    /// Opaque but not RGB8 (grayscale, 16-bit, float); channel-mapped to RGB8.
    ConvertToRgb,
    /// Carries an alpha channel; alpha-blended over [`BACKGROUND`].
    CompositeOnWhite,
}

impl Normalization {
    /// Pick the strategy for a decoded image.
    pub fn classify(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            Normalization::CompositeOnWhite
        } else if matches!(image, DynamicImage::ImageRgb8(_)) {
            Normalization::Passthrough
        } else {
            Normalization::ConvertToRgb
        }
    }

    /// Apply this strategy. Alpha and palette information is discarded.
    pub fn apply(self, image: DynamicImage) -> RgbRaster {
        let rgb = match self {
            Normalization::Passthrough | Normalization::ConvertToRgb => image.into_rgb8(),
            Normalization::CompositeOnWhite => composite_on_background(image),
        };
        RgbRaster::from_rgb_image(rgb)
    }
}

/// Normalize any decoded image to an opaque RGB raster.
pub fn normalize(image: DynamicImage) -> RgbRaster {
    Normalization::classify(&image).apply(image)
}

fn composite_on_background(image: DynamicImage) -> RgbImage {
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::from_pixel(width, height, Rgb(BACKGROUND));

    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let alpha = u32::from(a);
        dst.0 = [
            blend(r, BACKGROUND[0], alpha),
            blend(g, BACKGROUND[1], alpha),
            blend(b, BACKGROUND[2], alpha),
        ];
    }

    out
}

/// `value * a + background * (1 - a)` with `a = alpha / 255`, rounded.
#[inline]
fn blend(value: u8, background: u8, alpha: u32) -> u8 {
    let mixed = u32::from(value) * alpha + u32::from(background) * (255 - alpha);
    ((mixed + 127) / 255) as u8
}
