//! Intrinsic size extraction.
//!
//! GIF sizes come straight from the logical screen descriptor. SVG sizes
//! come from the root element's `viewBox`, or its `width`/`height`
//! attributes, with an 800x600 fallback when neither is declared. Callers
//! can tell a fallback apart from a declared size through
//! [`Dimensions::source`].

pub mod gif;
pub mod svg;

use serde::Serialize;

use crate::{error::Result, kind::MediaKind};

pub use svg::{PatternStrategy, SvgDimensionStrategy, SvgRootAttributes, XmlStrategy};

/// Width used when an SVG declares neither `viewBox` nor `width`.
pub const DEFAULT_WIDTH: f64 = 800.0;
/// Height used when an SVG declares neither `viewBox` nor `height`.
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Where a [`Dimensions`] value came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionSource {
    /// Third and fourth `viewBox` tokens.
    ViewBox,
    /// Both `width` and `height` attributes.
    Attributes,
    /// One of `width`/`height` was declared, the other is the default.
    PartialDefault,
    /// Nothing was declared; both values are the 800x600 fallback.
    Default,
    /// GIF logical screen descriptor.
    LogicalScreen,
}

/// Width and height of a source, in pixels (GIF) or user units (SVG).
///
/// SVG values are kept as `f64` because `viewBox` entries may be
/// fractional. A value that was present but not numeric is `NaN`; it is
/// never replaced by zero or by the default. Converting to a
/// [`ScaleDirective`](crate::ScaleDirective) is where such values are
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Dimensions {
    /// Horizontal size, `NaN` when declared but not numeric.
    pub width: f64,
    /// Vertical size, `NaN` when declared but not numeric.
    pub height: f64,
    /// Which declaration the values came from.
    pub source: DimensionSource,
}

impl Dimensions {
    /// Builds a size with its provenance.
    pub fn new(width: f64, height: f64, source: DimensionSource) -> Self {
        Self {
            width,
            height,
            source,
        }
    }

    /// The 800x600 fallback.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, DimensionSource::Default)
    }

    /// `true` when at least one side is the fallback value rather than a
    /// declared one.
    pub fn uses_default(&self) -> bool {
        matches!(
            self.source,
            DimensionSource::Default | DimensionSource::PartialDefault
        )
    }

    /// `true` when both sides are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Extracts the intrinsic size of `buffer`.
///
/// GIF buffers shorter than ten bytes fail with
/// [`SniffError::MalformedInput`](crate::SniffError::MalformedInput). SVG
/// extraction never fails; it uses [`XmlStrategy`].
pub fn extract_dimensions(buffer: &[u8], kind: MediaKind) -> Result<Dimensions> {
    extract_dimensions_with(buffer, kind, &XmlStrategy)
}

/// [`extract_dimensions`] with an explicit SVG strategy.
pub fn extract_dimensions_with(
    buffer: &[u8],
    kind: MediaKind,
    strategy: &dyn SvgDimensionStrategy,
) -> Result<Dimensions> {
    match kind {
        MediaKind::Gif => gif::logical_screen_size(buffer),
        MediaKind::Svg => Ok(strategy.extract(&String::from_utf8_lossy(buffer))),
    }
}

/// Resolves the kind from a declared content type, extension or token, then
/// extracts.
pub fn extract_dimensions_declared(
    buffer: &[u8],
    declared: &str,
) -> Result<Dimensions> {
    let kind = MediaKind::parse_declared(declared)?;
    extract_dimensions(buffer, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SniffError;

    #[test]
    fn dispatches_gif_to_logical_screen() {
        let gif = [b'G', b'I', b'F', b'8', b'9', b'a', 0x40, 0x01, 0xF0, 0x00];
        let dims = extract_dimensions(&gif, MediaKind::Gif).unwrap();
        assert_eq!((dims.width, dims.height), (320.0, 240.0));
        assert_eq!(dims.source, DimensionSource::LogicalScreen);
    }

    #[test]
    fn declared_kind_must_be_supported() {
        assert!(matches!(
            extract_dimensions_declared(b"<svg/>", "text/html"),
            Err(SniffError::InvalidFormat(_))
        ));
        let dims = extract_dimensions_declared(b"<svg/>", "image/svg+xml").unwrap();
        assert_eq!(dims, Dimensions::fallback());
    }

    #[test]
    fn fallback_is_visible() {
        assert!(Dimensions::fallback().uses_default());
        let declared = Dimensions::new(1.0, 2.0, DimensionSource::Attributes);
        assert!(!declared.uses_default());
    }

    #[test]
    fn nan_serializes_as_null() {
        let dims = Dimensions::new(f64::NAN, 10.0, DimensionSource::ViewBox);
        let json = serde_json::to_value(dims).unwrap();
        assert!(json["width"].is_null());
        assert_eq!(json["height"], 10.0);
        assert_eq!(json["source"], "view_box");
    }
}
