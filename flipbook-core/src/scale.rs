//! The `scale=W:H` directive handed to encoders.

use std::fmt;

use serde::Serialize;

use crate::{
    dimensions::Dimensions,
    error::{Result, SniffError},
};

/// Target size handed to an encoder, rendered as `scale=W:H`.
///
/// Both sides are positive integers. Fractional SVG sizes are rounded to
/// the nearest integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct ScaleDirective {
    /// Output width in pixels, at least 1.
    pub width: u32,
    /// Output height in pixels, at least 1.
    pub height: u32,
}

impl ScaleDirective {
    /// Fails with [`SniffError::AmbiguousParse`] when either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 {
            return Err(SniffError::AmbiguousParse {
                dimension: "width",
                value: 0.0,
            });
        }
        if height == 0 {
            return Err(SniffError::AmbiguousParse {
                dimension: "height",
                value: 0.0,
            });
        }
        Ok(Self { width, height })
    }

    /// ffmpeg filter expression.
    pub fn filter(&self) -> String {
        self.to_string()
    }
}

fn round_side(dimension: &'static str, value: f64) -> Result<u32> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded < 1.0 || rounded > f64::from(u32::MAX) {
        return Err(SniffError::AmbiguousParse { dimension, value });
    }
    Ok(rounded as u32)
}

impl TryFrom<&Dimensions> for ScaleDirective {
    type Error = SniffError;

    fn try_from(dims: &Dimensions) -> Result<Self> {
        Ok(Self {
            width: round_side("width", dims.width)?,
            height: round_side("height", dims.height)?,
        })
    }
}

impl fmt::Display for ScaleDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scale={}:{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DimensionSource;

    fn dims(width: f64, height: f64) -> Dimensions {
        Dimensions::new(width, height, DimensionSource::ViewBox)
    }

    #[test]
    fn renders_width_colon_height() {
        let scale = ScaleDirective::try_from(&dims(120.0, 80.0)).unwrap();
        assert_eq!(scale.to_string(), "scale=120:80");
        assert_eq!(scale.filter(), "scale=120:80");
    }

    #[test]
    fn rounds_fractional_sizes() {
        let scale = ScaleDirective::try_from(&dims(12.5, 7.49)).unwrap();
        assert_eq!((scale.width, scale.height), (13, 7));
    }

    #[test]
    fn nan_is_ambiguous() {
        let err = ScaleDirective::try_from(&dims(f64::NAN, 5.0)).unwrap_err();
        assert!(matches!(
            err,
            SniffError::AmbiguousParse {
                dimension: "width",
                ..
            }
        ));
    }

    #[test]
    fn zero_negative_and_infinite_are_rejected() {
        assert!(ScaleDirective::try_from(&dims(0.4, 5.0)).is_err());
        assert!(ScaleDirective::try_from(&dims(5.0, -3.0)).is_err());
        assert!(ScaleDirective::try_from(&dims(f64::INFINITY, 5.0)).is_err());
        assert!(ScaleDirective::new(0, 1).is_err());
    }
}
