//! Raster resizing: long-edge capping and the uniform shrink step.
//!
//! All functions return new `RgbRaster` instances without modifying the input.
//! Target dimensions never drop below one pixel. Every resample uses Lanczos3.

use image::imageops::FilterType;

use super::RgbRaster;

/// Resampling filter for every resize in the pipeline.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Resize a raster to exact dimensions.
///
/// Zero targets are raised to one pixel. Matching dimensions return a clone.
pub fn resize(raster: &RgbRaster, width: u32, height: u32) -> RgbRaster {
    let (width, height) = (width.max(1), height.max(1));

    if raster.dimensions() == (width, height) {
        return raster.clone();
    }

    let resized = image::imageops::resize(raster.as_rgb_image(), width, height, RESAMPLE_FILTER);
    RgbRaster::from_rgb_image(resized)
}

/// Cap the long edge of a raster at `max_edge`, preserving aspect ratio.
///
/// Rasters whose long edge is already within the cap are returned unchanged.
pub fn cap_long_edge(raster: &RgbRaster, max_edge: u32) -> RgbRaster {
    match capped_dimensions(raster.width(), raster.height(), max_edge) {
        Some((width, height)) => resize(raster, width, height),
        None => raster.clone(),
    }
}

/// Shrink both dimensions by `factor`, truncating to whole pixels.
pub fn shrink(raster: &RgbRaster, factor: f64) -> RgbRaster {
    let (width, height) = shrunk_dimensions(raster.width(), raster.height(), factor);
    resize(raster, width, height)
}

/// Dimensions after capping the long edge at `max_edge`.
///
/// Returns `None` when no capping is needed. Both edges are scaled by
/// `max_edge / long_edge` and rounded to the nearest pixel.
pub fn capped_dimensions(width: u32, height: u32, max_edge: u32) -> Option<(u32, u32)> {
    let long_edge = width.max(height);
    if long_edge <= max_edge {
        return None;
    }

    let ratio = max_edge as f64 / long_edge as f64;
    let new_width = (width as f64 * ratio).round() as u32;
    let new_height = (height as f64 * ratio).round() as u32;
    Some((new_width.max(1), new_height.max(1)))
}

/// Dimensions after a uniform shrink by `factor`.
pub fn shrunk_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let new_width = (width as f64 * factor) as u32;
    let new_height = (height as f64 * factor) as u32;
    (new_width.max(1), new_height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_raster(width: u32, height: u32) -> RgbRaster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        RgbRaster::from_raw(width, height, pixels).unwrap()
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_raster(100, 50);
        let resized = resize(&img, 50, 25);

        assert_eq!(resized.dimensions(), (50, 25));
        assert_eq!(resized.pixels().len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let img = create_test_raster(100, 50);
        let resized = resize(&img, 100, 50);
        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_zero_target_clamps_to_one() {
        let img = create_test_raster(10, 10);
        let resized = resize(&img, 0, 0);
        assert_eq!(resized.dimensions(), (1, 1));
    }

    #[test]
    fn test_cap_landscape() {
        let img = create_test_raster(2400, 1200);
        let capped = cap_long_edge(&img, 1600);
        assert_eq!(capped.dimensions(), (1600, 800));
    }

    #[test]
    fn test_cap_portrait() {
        let img = create_test_raster(900, 2000);
        let capped = cap_long_edge(&img, 1600);
        assert_eq!(capped.dimensions(), (720, 1600));
    }

    #[test]
    fn test_cap_already_within_limit() {
        let img = create_test_raster(100, 50);
        let capped = cap_long_edge(&img, 1600);
        assert_eq!(capped, img);
    }

    #[test]
    fn test_capped_dimensions_exactly_at_limit() {
        assert_eq!(capped_dimensions(1600, 1600, 1600), None);
        assert_eq!(capped_dimensions(1600, 900, 1600), None);
    }

    #[test]
    fn test_capped_dimensions_square() {
        assert_eq!(capped_dimensions(2000, 2000, 1600), Some((1600, 1600)));
    }

    #[test]
    fn test_capped_dimensions_rounds_to_nearest() {
        // 4000 * (1600/6000) = 1066.67
        assert_eq!(capped_dimensions(6000, 4000, 1600), Some((1600, 1067)));
    }

    #[test]
    fn test_capped_dimensions_extreme_aspect() {
        // Short edge would round to zero
        assert_eq!(capped_dimensions(10_000, 2, 1600), Some((1600, 1)));
    }

    #[test]
    fn test_shrunk_dimensions_truncates() {
        assert_eq!(shrunk_dimensions(1600, 1067, 0.8), (1280, 853));
        assert_eq!(shrunk_dimensions(1, 1, 0.8), (1, 1));
    }

    #[test]
    fn test_shrink_raster() {
        let img = create_test_raster(100, 60);
        let shrunk = shrink(&img, 0.8);
        assert_eq!(shrunk.dimensions(), (80, 48));
    }

}
