//! strip-compose: join product module images into a single strip
//!
//! The crate takes already-decoded module photos (sofa segments, shelf
//! units, ...) and produces one continuous image. It performs no I/O;
//! fetching and encoding belong to the caller.
//!
//! # Quick Start
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use strip_compose::{render, BackgroundModel, PipelineConfig, RasterImage};
//!
//! let module = RasterImage::from_rgba(RgbaImage::from_fn(100, 200, |x, _| {
//!     if (10..90).contains(&x) {
//!         Rgba([120, 80, 40, 255])
//!     } else {
//!         Rgba([0, 0, 0, 0])
//!     }
//! }));
//!
//! let config = PipelineConfig::new()
//!     .trim(BackgroundModel::AlphaThreshold { cutoff: 10 })
//!     .padding(0)
//!     .seam_crop(5)
//!     .background(None);
//!
//! let strip = render(vec![module.clone(), module], &config).unwrap();
//! assert_eq!(strip.dimensions(), (150, 200));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! decoded images
//!     |
//!     v
//! [size guard]     downscale so the longer side fits max_dimension
//!     |
//!     v
//! [trim]           crop background margins, keep `padding`
//!     |
//!     v
//! [normalize]      common height (minimum, or explicit target)
//!     |
//!     v
//! [seam crop]      shave interior-facing edges
//!     |
//!     v
//! [composite]      left to right on a transparent canvas
//!     |
//!     +---> [shadow]   soft ellipse under the content (optional)
//!     +---> [base]     rounded plinth below the canvas (optional)
//!     |
//!     v
//! [flatten]        onto the background color, unless transparent
//! ```
//!
//! Each stage takes its input by value and returns freshly allocated
//! images, so stages can be called on their own as well.
//!
//! # Background Models
//!
//! The trimmer decides what is "background" through [`BackgroundModel`]:
//!
//! - `FixedColorThreshold`: Euclidean RGB distance to a known color
//! - `CornerSampledThreshold`: same, with the color read from the corners
//! - `AlphaThreshold`: alpha at or below a cutoff, for cut-out PNGs

pub mod background;
pub mod bbox;
pub mod color;
pub mod composite;
pub mod embellish;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod raster;
pub mod seam;
pub mod trim;

#[cfg(test)]
mod domain_tests;

pub use background::{BackgroundModel, DEFAULT_ALPHA_CUTOFF, DEFAULT_TOLERANCE};
pub use bbox::BoundingBox;
pub use color::Rgb;
pub use composite::{composite, flatten};
pub use embellish::{add_base, add_shadow, BaseOptions, ShadowOptions};
pub use error::{ComposeError, ParseColorError};
pub use normalize::{normalize, normalize_to, scaled_width};
pub use pipeline::{render, PipelineConfig, DEFAULT_MAX_DIMENSION, DEFAULT_PADDING};
pub use raster::{check_canvas, ColorMode, RasterImage, MAX_CANVAS_PIXELS};
pub use seam::seam_crop;
pub use trim::{find_foreground_box, trim};
