//! Error types for strip-compose.
//!
//! [`ComposeError`] covers decoding and pipeline faults, [`ParseColorError`]
//! covers color string parsing.

use std::fmt;
use std::num::ParseIntError;

/// Error type for parsing color strings.
///
/// Returned when a string is neither a supported color name nor a valid
/// `#rgb` / `#rrggbb` hex value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    InvalidLength,
    /// Invalid hexadecimal character encountered
    InvalidHex(ParseIntError),
    /// Not a hex value and not a known color name
    UnknownName(String),
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 characters)")
            }
            ParseColorError::InvalidHex(err) => write!(f, "invalid hex character: {}", err),
            ParseColorError::UnknownName(name) => write!(f, "unknown color name '{}'", name),
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            _ => None,
        }
    }
}

/// Unified error type for the compose pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposeError {
    /// Bytes could not be decoded as a supported raster format
    Decode(String),
    /// Decoded image has a zero dimension
    EmptyImage {
        /// Decoded width
        width: u32,
        /// Decoded height
        height: u32,
    },
    /// The pipeline was invoked without any images
    EmptyInput,
    /// A drawing surface could not be allocated
    Allocation {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::Decode(msg) => write!(f, "decode error: {}", msg),
            ComposeError::EmptyImage { width, height } => {
                write!(f, "image has no pixels ({}x{})", width, height)
            }
            ComposeError::EmptyInput => write!(f, "no images to compose"),
            ComposeError::Allocation { width, height } => {
                write!(f, "failed to allocate {}x{} drawing surface", width, height)
            }
        }
    }
}

impl std::error::Error for ComposeError {}
