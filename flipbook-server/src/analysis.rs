//! Sniff and measure a source before it is handed to a transcoder.

use flipbook_core::{
    AnimationVerdict, Dimensions, MediaKind, OutputContainer, ScaleDirective,
    SniffError, classify,
    dimensions::{SvgDimensionStrategy, extract_dimensions_with},
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct Analysis {
    pub kind: MediaKind,
    pub verdict: AnimationVerdict,
    pub container: OutputContainer,
    pub dimensions: Dimensions,
}

impl Analysis {
    /// The `scale=W:H` directive, failing when a side is not a usable size.
    pub fn scale(&self) -> Result<ScaleDirective, SniffError> {
        ScaleDirective::try_from(&self.dimensions)
    }
}

pub fn analyze(
    buffer: &[u8],
    kind: MediaKind,
    strategy: &dyn SvgDimensionStrategy,
) -> Result<Analysis, SniffError> {
    let verdict = classify(buffer, kind);
    let dimensions = extract_dimensions_with(buffer, kind, strategy)?;
    let container = OutputContainer::for_verdict(verdict);

    if dimensions.uses_default() {
        warn!(
            kind = %kind,
            width = dimensions.width,
            height = dimensions.height,
            "source declares no size, using default"
        );
    }

    info!(
        kind = %kind,
        animated = verdict.animated,
        container = %container,
        width = dimensions.width,
        height = dimensions.height,
        "classified source"
    );

    Ok(Analysis {
        kind,
        verdict,
        container,
        dimensions,
    })
}

/// Body of `POST /api/v1/inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct InspectResponse {
    pub kind: MediaKind,
    pub animated: bool,
    pub container: OutputContainer,
    pub dimensions: Dimensions,
    /// `None` when a dimension is not a usable size.
    pub scale: Option<String>,
}

impl From<&Analysis> for InspectResponse {
    fn from(analysis: &Analysis) -> Self {
        Self {
            kind: analysis.kind,
            animated: analysis.verdict.animated,
            container: analysis.container,
            dimensions: analysis.dimensions,
            scale: analysis.scale().ok().map(|scale| scale.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipbook_core::dimensions::{DimensionSource, XmlStrategy};

    #[test]
    fn animated_svg_maps_to_mp4() {
        let svg = br#"<svg viewBox="0 0 120 80"><animate attributeName="x"/></svg>"#;
        let analysis = analyze(svg, MediaKind::Svg, &XmlStrategy).unwrap();
        assert!(analysis.verdict.animated);
        assert_eq!(analysis.container, OutputContainer::Mp4);
        assert_eq!(analysis.scale().unwrap().to_string(), "scale=120:80");
    }

    #[test]
    fn unusable_size_surfaces_only_when_scaling() {
        let svg = br#"<svg width="auto" height="40"></svg>"#;
        let analysis = analyze(svg, MediaKind::Svg, &XmlStrategy).unwrap();
        assert_eq!(analysis.dimensions.source, DimensionSource::Attributes);
        assert!(matches!(
            analysis.scale(),
            Err(SniffError::AmbiguousParse {
                dimension: "width",
                ..
            })
        ));

        let response = InspectResponse::from(&analysis);
        assert_eq!(response.scale, None);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["dimensions"]["width"].is_null());
        assert_eq!(json["dimensions"]["height"], 40.0);
    }

    #[test]
    fn short_gif_is_malformed() {
        let err = analyze(b"GIF89a", MediaKind::Gif, &XmlStrategy).unwrap_err();
        assert!(matches!(err, SniffError::MalformedInput { .. }));
    }
}
