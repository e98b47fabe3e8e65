//! GIF frame scan.
//!
//! A GIF is animated when it carries more than one Graphic Control
//! Extension. The scan starts after the 13-byte header and logical screen
//! descriptor and walks forward:
//!
//! - `0x21 0xF9` (Graphic Control Extension): count a frame, skip the
//!   8-byte block.
//! - `0x2C` (Image Descriptor): skip the 10-byte descriptor plus the LZW
//!   minimum code size byte.
//! - anything else: advance one byte.
//!
//! Buffers without the `GIF` signature, shorter than the header, or ending
//! inside a Graphic Control Extension never read out of bounds; whatever is
//! missing counts as "no marker" and the verdict is static.

use tracing::debug;

/// Magic bytes at offset 0.
pub const GIF_SIGNATURE: &[u8; 3] = b"GIF";
/// Header (6) plus logical screen descriptor (7).
pub const HEADER_LEN: usize = 13;
/// Extension introducer followed by the graphic control label.
pub const GRAPHIC_CONTROL_INTRODUCER: [u8; 2] = [0x21, 0xF9];
/// Introducer, label, block size, 4 data bytes, block terminator.
pub const GRAPHIC_CONTROL_BLOCK_LEN: usize = 8;
/// Image separator.
pub const IMAGE_DESCRIPTOR: u8 = 0x2C;
/// Image descriptor (10) plus LZW minimum code size (1).
pub const IMAGE_DESCRIPTOR_SKIP: usize = 11;

/// `true` once a second Graphic Control Extension is found.
pub fn is_animated_gif(bytes: &[u8]) -> bool {
    scan_graphic_controls(bytes, Some(2)) > 1
}

/// Number of complete Graphic Control Extensions the block walk sees.
///
/// Single-frame GIFs that use a Graphic Control Extension for transparency
/// report 1 here; animations report one per frame.
pub fn count_graphic_controls(bytes: &[u8]) -> usize {
    scan_graphic_controls(bytes, None)
}

fn scan_graphic_controls(bytes: &[u8], stop_at: Option<usize>) -> usize {
    if !bytes.starts_with(GIF_SIGNATURE) {
        debug!("GIF signature missing; treating source as static");
        return 0;
    }
    if bytes.len() < HEADER_LEN {
        debug!(len = bytes.len(), "GIF shorter than its header");
        return 0;
    }

    let mut pos = HEADER_LEN;
    let mut count = 0;

    while pos < bytes.len() {
        let rest = &bytes[pos..];

        if rest.starts_with(&GRAPHIC_CONTROL_INTRODUCER) {
            if rest.len() < GRAPHIC_CONTROL_BLOCK_LEN {
                debug!(pos, "truncated graphic control extension");
                break;
            }
            count += 1;
            if stop_at.is_some_and(|limit| count >= limit) {
                break;
            }
            pos += GRAPHIC_CONTROL_BLOCK_LEN;
        } else if rest[0] == IMAGE_DESCRIPTOR {
            pos += IMAGE_DESCRIPTOR_SKIP;
        } else {
            pos += 1;
        }
    }

    count
}

/// First-marker variant of the animation check.
///
/// Reports animation as soon as one Graphic Control Extension appears, with
/// no signature check and no block skipping. Every GIF89a frame may carry a
/// Graphic Control Extension, including the only frame of a still image
/// that uses one for transparency, so this misclassifies static images.
#[deprecated(
    since = "0.1.0",
    note = "a single Graphic Control Extension does not imply animation; use `is_animated_gif`"
)]
pub fn legacy_gce_present(bytes: &[u8]) -> bool {
    bytes
        .get(HEADER_LEN..)
        .is_some_and(|body| {
            body.windows(2)
                .any(|pair| pair == GRAPHIC_CONTROL_INTRODUCER.as_slice())
        })
}
