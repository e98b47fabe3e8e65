//! Animated-vs-static classification.
//!
//! The SVG check is a substring heuristic over the document text. The GIF
//! check walks the block structure after the logical screen descriptor and
//! counts Graphic Control Extensions; see [`gif`] for the scan rules.

pub mod gif;
pub mod svg;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{error::Result, kind::MediaKind};

/// Outcome of sniffing a source buffer.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
pub struct AnimationVerdict {
    /// `true` when the source carries more than one frame (GIF) or an
    /// animation element (SVG).
    pub animated: bool,
}

impl AnimationVerdict {
    /// No animation found.
    pub const STATIC: Self = Self { animated: false };
    /// Animation found.
    pub const ANIMATED: Self = Self { animated: true };
}

impl From<bool> for AnimationVerdict {
    fn from(animated: bool) -> Self {
        Self { animated }
    }
}

/// Classifies `buffer` as animated or static for a known kind.
pub fn classify(buffer: &[u8], kind: MediaKind) -> AnimationVerdict {
    let animated = match kind {
        MediaKind::Svg => svg::is_animated_svg(&String::from_utf8_lossy(buffer)),
        MediaKind::Gif => gif::is_animated_gif(buffer),
    };
    trace!(%kind, animated, bytes = buffer.len(), "sniffed source buffer");
    AnimationVerdict::from(animated)
}

/// Like [`classify`], but resolves the kind from a declared content type,
/// extension or token first. Unsupported kinds fail with
/// [`SniffError::InvalidFormat`](crate::SniffError::InvalidFormat).
pub fn classify_declared(
    buffer: &[u8],
    declared: &str,
) -> Result<AnimationVerdict> {
    let kind = MediaKind::parse_declared(declared)?;
    Ok(classify(buffer, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SniffError;

    #[test]
    fn classify_dispatches_on_kind() {
        let svg = br#"<svg><rect><animate attributeName="x"/></rect></svg>"#;
        assert_eq!(classify(svg, MediaKind::Svg), AnimationVerdict::ANIMATED);
        // The same bytes are not a GIF, so the frame scan bails out.
        assert_eq!(classify(svg, MediaKind::Gif), AnimationVerdict::STATIC);
    }

    #[test]
    fn classify_declared_rejects_unknown_kinds() {
        assert_eq!(
            classify_declared(b"\x89PNG", "image/png"),
            Err(SniffError::InvalidFormat("image/png".into()))
        );
    }

    #[test]
    fn classify_declared_accepts_mime_and_names() {
        let svg = b"<svg><set to='1'/></svg>";
        assert_eq!(
            classify_declared(svg, "image/svg+xml"),
            Ok(AnimationVerdict::ANIMATED)
        );
        assert_eq!(
            classify_declared(svg, "drawing.svg"),
            Ok(AnimationVerdict::ANIMATED)
        );
    }

    #[test]
    fn verdict_serializes_as_flag() {
        let json = serde_json::to_string(&AnimationVerdict::ANIMATED).unwrap();
        assert_eq!(json, r#"{"animated":true}"#);
    }
}
