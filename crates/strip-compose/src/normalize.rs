//! Height normalization.
//!
//! Modules are brought to a common height so they line up in one row.
//! By default that height is the smallest input height: downscaling keeps
//! edges crisp while upscaling would blur them.

use crate::raster::RasterImage;

/// Scale every image to the minimum input height. Order is preserved.
pub fn normalize(images: Vec<RasterImage>) -> Vec<RasterImage> {
    match images.iter().map(RasterImage::height).min() {
        Some(target) => normalize_to(images, target),
        None => images,
    }
}

/// Scale every image to `target_height` (floored at 1). Order is preserved.
pub fn normalize_to(images: Vec<RasterImage>, target_height: u32) -> Vec<RasterImage> {
    let target = target_height.max(1);
    images
        .into_iter()
        .map(|image| scale_to_height(image, target))
        .collect()
}

/// Aspect-preserving resize to `target_height`.
///
/// Images already at the target height are returned untouched.
pub fn scale_to_height(image: RasterImage, target_height: u32) -> RasterImage {
    let (width, height) = image.dimensions();
    if height == target_height {
        return image;
    }
    let scaled = u32::try_from(scaled_width(width, height, target_height)).unwrap_or(u32::MAX);
    image.resize(scaled, target_height)
}

/// Width of a `width` x `height` image once scaled to `target_height`,
/// rounded and floored at 1.
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u64 {
    let scaled = (width as f64 * target_height as f64 / height.max(1) as f64).round();
    (scaled as u64).max(1)
}
