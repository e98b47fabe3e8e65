//! GIF logical screen size.

use super::{DimensionSource, Dimensions};
use crate::{
    error::{Result, SniffError},
    kind::MediaKind,
};

/// Bytes needed to reach the end of the canvas height field.
pub const MIN_SIZE_HEADER_LEN: usize = 10;

/// Reads the canvas size from the logical screen descriptor: little-endian
/// width at bytes 6-7, height at bytes 8-9. The signature is not checked.
pub fn logical_screen_size(bytes: &[u8]) -> Result<Dimensions> {
    let Some(field) = bytes.get(6..MIN_SIZE_HEADER_LEN) else {
        return Err(SniffError::MalformedInput {
            kind: MediaKind::Gif,
            needed: MIN_SIZE_HEADER_LEN,
            actual: bytes.len(),
        });
    };

    let width = u16::from_le_bytes([field[0], field[1]]);
    let height = u16::from_le_bytes([field[2], field[3]]);

    Ok(Dimensions::new(
        f64::from(width),
        f64::from(height),
        DimensionSource::LogicalScreen,
    ))
}
