//! 8-bit RGB color type.
//!
//! Colors are parsed from `#rgb` / `#rrggbb` hex strings (the `#` is
//! optional) or from a short list of CSS color names.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::ParseColorError;

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("white", Rgb::WHITE),
    ("black", Rgb::BLACK),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("silver", Rgb::new(192, 192, 192)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("blue", Rgb::new(0, 0, 255)),
];

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance to `other` in 8-bit RGB space.
    ///
    /// # Example
    /// ```
    /// use strip_compose::Rgb;
    /// assert_eq!(Rgb::new(0, 0, 0).distance(Rgb::new(3, 4, 0)), 5.0);
    /// ```
    #[inline]
    pub fn distance(&self, other: Rgb) -> f32 {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    pub(crate) fn distance_squared(&self, other: Rgb) -> f32 {
        let dr = self.r as f32 - other.r as f32;
        let dg = self.g as f32 - other.g as f32;
        let db = self.b as f32 - other.b as f32;
        dr * dr + dg * dg + db * db
    }

    /// RGB part of an RGBA pixel (alpha discarded).
    #[inline]
    pub fn from_pixel(pixel: Rgba<u8>) -> Self {
        let [r, g, b, _] = pixel.0;
        Self { r, g, b }
    }

    #[inline]
    pub fn with_alpha(self, alpha: u8) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, alpha])
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((_, color)) = NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        {
            return Ok(*color);
        }

        let has_hash = trimmed.starts_with('#');
        let hex = trimmed.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ParseColorError::UnknownName(trimmed.to_string()));
        }

        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                Ok(Self::new(byte(0)?, byte(2)?, byte(4)?))
            }
            _ if has_hash => Err(ParseColorError::InvalidLength),
            _ => Err(ParseColorError::UnknownName(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
