//! Domain regression tests for strip-compose.
//!
//! Each test pins down one property a downstream caller relies on and says
//! what a failure would mean.

#[cfg(test)]
mod domain_tests {
    use image::{Rgba, RgbaImage};

    use crate::background::BackgroundModel;
    use crate::color::Rgb;
    use crate::composite::composite;
    use crate::normalize::normalize;
    use crate::pipeline::{render, PipelineConfig};
    use crate::raster::RasterImage;
    use crate::seam::seam_crop;
    use crate::trim::{find_foreground_box, trim};

    /// 100x200 RGBA frame: opaque red block for x in [10, 90), transparent
    /// everywhere else.
    fn sofa_module() -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_fn(100, 200, |x, _| {
            if (10..90).contains(&x) {
                Rgba([200, 30, 30, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        }))
    }

    // ========================================================================
    // End-to-end geometry
    // ========================================================================

    /// If this breaks, it means: one of trim / seam crop / composite changed
    /// its geometry. Two 80 px wide trimmed modules with a 5 px seam lose
    /// 5 px each on the shared edge, giving a 150 px strip.
    #[test]
    fn test_two_module_strip_geometry() {
        let model = BackgroundModel::AlphaThreshold { cutoff: 10 };

        let bbox = find_foreground_box(&sofa_module(), &model).unwrap();
        assert_eq!(bbox.as_tuple(), (10, 0, 90, 200));

        let trimmed: Vec<_> = [sofa_module(), sofa_module()]
            .into_iter()
            .map(|img| trim(img, &model, 0))
            .collect();
        let normalized = normalize(trimmed);
        let cropped = seam_crop(normalized, 5);
        let widths: Vec<u32> = cropped.iter().map(RasterImage::width).collect();
        assert_eq!(widths, vec![75, 75]);

        let strip = composite(cropped, None, 0).unwrap();
        assert_eq!(strip.dimensions(), (150, 200));
    }

    /// If this breaks, it means: the pipeline entry point wires stages
    /// differently from the stage functions called by hand.
    #[test]
    fn test_render_matches_manual_stages() {
        let config = PipelineConfig::new()
            .trim(BackgroundModel::AlphaThreshold { cutoff: 10 })
            .padding(0)
            .seam_crop(5)
            .background(None);
        let strip = render(vec![sofa_module(), sofa_module()], &config).unwrap();
        assert_eq!(strip.dimensions(), (150, 200));
        // No transparent seam between the modules
        assert_eq!(strip.pixel(74, 100), Rgba([200, 30, 30, 255]));
        assert_eq!(strip.pixel(75, 100), Rgba([200, 30, 30, 255]));
    }

    // ========================================================================
    // Trimming
    // ========================================================================

    /// If this breaks, it means: trimming is no longer idempotent, so a
    /// cached or pre-trimmed image would shrink further on every request.
    #[test]
    fn test_trim_idempotent() {
        let models = [
            BackgroundModel::AlphaThreshold { cutoff: 10 },
            BackgroundModel::FixedColorThreshold {
                color: Rgb::WHITE,
                tolerance: 18.0,
            },
            BackgroundModel::CornerSampledThreshold { tolerance: 18.0 },
        ];
        for model in models {
            let once = trim(sofa_module(), &model, 0);
            let twice = trim(once.clone(), &model, 0);
            assert_eq!(once, twice, "model {:?}", model);
        }
    }

    /// If this breaks, it means: an all-white frame is cropped to nothing
    /// or otherwise altered instead of being passed through.
    #[test]
    fn test_all_background_passes_through() {
        let blank = RasterImage::from_rgba(RgbaImage::from_pixel(
            64,
            32,
            Rgba([255, 255, 255, 255]),
        ));
        let out = trim(blank.clone(), &BackgroundModel::default(), 4);
        assert_eq!(out, blank);
    }

    // ========================================================================
    // Normalization and seams
    // ========================================================================

    /// If this breaks, it means: modules come out at different heights and
    /// the composite shows a ragged top edge.
    #[test]
    fn test_normalized_heights_equal_minimum() {
        let images = vec![
            RasterImage::from_rgba(RgbaImage::from_pixel(40, 90, Rgba([1, 1, 1, 255]))),
            RasterImage::from_rgba(RgbaImage::from_pixel(40, 60, Rgba([1, 1, 1, 255]))),
            RasterImage::from_rgba(RgbaImage::from_pixel(40, 120, Rgba([1, 1, 1, 255]))),
        ];
        let out = normalize(images);
        assert!(out.iter().all(|img| img.height() == 60));
    }

    /// If this breaks, it means: `seam_crop(.., 0)` touches pixels.
    #[test]
    fn test_zero_seam_is_pixel_identical() {
        let images = vec![sofa_module(), sofa_module()];
        assert_eq!(seam_crop(images.clone(), 0), images);
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// If this breaks, it means: the composite width formula drifted and
    /// modules overlap or separate without being asked to.
    #[test]
    fn test_width_is_sum_for_zero_overlap() {
        let widths = [13u32, 7, 29, 1];
        let images: Vec<_> = widths
            .iter()
            .map(|w| RasterImage::from_rgba(RgbaImage::from_pixel(*w, 9, Rgba([0, 0, 0, 255]))))
            .collect();
        let strip = composite(images, Some(Rgb::WHITE), 0).unwrap();
        assert_eq!(strip.width(), widths.iter().sum::<u32>());
        assert_eq!(strip.height(), 9);
    }

    /// If this breaks, it means: a single module is re-encoded through a
    /// canvas when nothing asked for a background.
    #[test]
    fn test_single_module_pass_through() {
        let out = composite(vec![sofa_module()], None, 0).unwrap();
        assert_eq!(out, sofa_module());
    }
}
