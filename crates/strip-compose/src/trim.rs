//! Background margin trimming.

use crate::background::BackgroundModel;
use crate::bbox::BoundingBox;
use crate::raster::RasterImage;

/// Smallest box enclosing every foreground pixel, or `None` when the image
/// is all background.
pub fn find_foreground_box(image: &RasterImage, model: &BackgroundModel) -> Option<BoundingBox> {
    let classifier = model.classifier(image);
    let (width, height) = image.dimensions();

    let (mut left, mut top) = (width, height);
    let (mut right, mut bottom) = (0u32, 0u32);

    for (x, y, pixel) in image.as_rgba().enumerate_pixels() {
        if classifier.is_foreground(*pixel) {
            left = left.min(x);
            top = top.min(y);
            right = right.max(x + 1);
            bottom = bottom.max(y + 1);
        }
    }

    BoundingBox::new(left, top, right, bottom)
}

/// Crop `image` to its foreground plus `padding` pixels on every side.
///
/// An all-background image is returned unchanged, as is an image whose
/// padded box already spans the whole frame.
pub fn trim(image: RasterImage, model: &BackgroundModel, padding: u32) -> RasterImage {
    let (width, height) = image.dimensions();
    let Some(bbox) = find_foreground_box(&image, model) else {
        tracing::debug!(width, height, "No foreground found, keeping image untrimmed");
        return image;
    };

    let padded = bbox.expand(padding, width, height);
    if padded.covers(width, height) {
        return image;
    }

    tracing::trace!(
        bbox = ?padded.as_tuple(),
        from_width = width,
        from_height = height,
        "Trimmed background margins"
    );
    image.crop(padded)
}
