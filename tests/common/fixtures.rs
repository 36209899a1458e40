//! Test fixtures: small PNG module images built in memory.

use std::io::Cursor;

/// Encode raw RGBA pixels as a PNG
pub fn png_rgba(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(rgba).unwrap();
    }
    buf.into_inner()
}

/// 100x200 module: opaque block for x in [10, 90), transparent elsewhere
pub fn cutout_module() -> Vec<u8> {
    let mut rgba = Vec::with_capacity(100 * 200 * 4);
    for _y in 0..200 {
        for x in 0..100u32 {
            if (10..90).contains(&x) {
                rgba.extend_from_slice(&[120, 80, 40, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    png_rgba(100, 200, &rgba)
}

/// Product photo on white: dark block at x in [20, 60), y in [10, 50)
/// of an 80x60 white frame
pub fn white_framed_module() -> Vec<u8> {
    let mut rgba = Vec::with_capacity(80 * 60 * 4);
    for y in 0..60u32 {
        for x in 0..80u32 {
            if (20..60).contains(&x) && (10..50).contains(&y) {
                rgba.extend_from_slice(&[30, 30, 30, 255]);
            } else {
                rgba.extend_from_slice(&[255, 255, 255, 255]);
            }
        }
    }
    png_rgba(80, 60, &rgba)
}
