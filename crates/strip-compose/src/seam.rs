//! Interior seam cropping.
//!
//! Product shots usually carry a thin border on each side. Cropping the
//! edges that face a neighbour lets adjacent modules read as one piece,
//! while the outer edges of the strip keep their border.

use crate::bbox::BoundingBox;
use crate::raster::RasterImage;

/// Smallest width a cropped image may keep; narrower results are skipped.
const MIN_REMAINING_WIDTH: u32 = 3;

/// Remove up to `crop_width` pixels from every interior-facing edge.
///
/// The first image loses its right edge, the last its left edge, and the
/// ones in between lose both. Each side's crop is clamped to a quarter of
/// the image width. A no-op for `crop_width == 0` or fewer than two images.
pub fn seam_crop(images: Vec<RasterImage>, crop_width: u32) -> Vec<RasterImage> {
    if crop_width == 0 || images.len() < 2 {
        return images;
    }
    let last = images.len() - 1;
    images
        .into_iter()
        .enumerate()
        .map(|(index, image)| crop_edges(image, crop_width, index > 0, index < last))
        .collect()
}

fn crop_edges(image: RasterImage, crop_width: u32, left: bool, right: bool) -> RasterImage {
    let (width, height) = image.dimensions();
    let per_side = crop_width.min(width / 4);
    let left_cut = if left { per_side } else { 0 };
    let right_cut = if right { per_side } else { 0 };

    if left_cut + right_cut == 0 || width - left_cut - right_cut < MIN_REMAINING_WIDTH {
        return image;
    }

    match BoundingBox::new(left_cut, 0, width - right_cut, height) {
        Some(bbox) => image.crop(bbox),
        None => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Image whose red channel encodes the column index.
    fn columns(width: u32, height: u32) -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_fn(width, height, |x, _| {
            Rgba([x as u8, 0, 0, 255])
        }))
    }

    #[test]
    fn test_zero_crop_is_identity() {
        let input = vec![columns(40, 10), columns(40, 10)];
        assert_eq!(seam_crop(input.clone(), 0), input);
    }

    #[test]
    fn test_single_image_untouched() {
        let input = vec![columns(40, 10)];
        assert_eq!(seam_crop(input.clone(), 5), input);
    }

    #[test]
    fn test_interior_edges_only() {
        let out = seam_crop(vec![columns(40, 10), columns(40, 10), columns(40, 10)], 5);
        assert_eq!(out[0].width(), 35);
        assert_eq!(out[0].pixel(0, 0).0[0], 0);
        assert_eq!(out[1].width(), 30);
        assert_eq!(out[1].pixel(0, 0).0[0], 5);
        assert_eq!(out[2].width(), 35);
        assert_eq!(out[2].pixel(0, 0).0[0], 5);
        assert_eq!(out[2].pixel(34, 0).0[0], 39);
    }

    #[test]
    fn test_crop_clamped_to_quarter_width() {
        let out = seam_crop(vec![columns(20, 4), columns(20, 4), columns(20, 4)], 100);
        assert_eq!(out[0].width(), 15);
        assert_eq!(out[1].width(), 10);
        assert_eq!(out[2].width(), 15);
    }

    #[test]
    fn test_tiny_images_left_alone() {
        // 4 px wide: quarter is 1, interior would keep 2 px -> skip
        let out = seam_crop(vec![columns(4, 4), columns(4, 4), columns(4, 4)], 3);
        assert_eq!(out[1].width(), 4);
        // 3 px wide: quarter is 0 -> nothing to crop
        let out = seam_crop(vec![columns(3, 4), columns(3, 4)], 3);
        assert!(out.iter().all(|img| img.width() == 3));
    }

    #[test]
    fn test_never_at_or_below_two_pixels() {
        for width in 1..40 {
            let out = seam_crop(
                vec![columns(width, 2), columns(width, 2), columns(width, 2)],
                width,
            );
            for img in out {
                assert!(img.width() > 2 || img.width() == width);
            }
        }
    }
}
